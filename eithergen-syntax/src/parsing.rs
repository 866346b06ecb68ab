use std::cell::Cell;

use proc_macro2::{Delimiter, TokenStream, TokenTree};
use syn::{
    Token,
    ext::IdentExt as _,
    parse::{ParseStream, Parser as _},
};

use crate::{
    model::{
        AttributeArgument, Constraint, ConstructorSignature, DeclKind, Location, MethodSignature,
        Modifier, NullableContext, Predefined, Segment, TupleElement, TypeArguments, TypeKind,
        TypeParameter, TypeRef,
    },
    tree::{
        AttributeArgumentSyntax, AttributeSyntax, CompilationUnit, Item, MemberSyntax,
        NamespaceDecl, TypeDecl, TypeDeclKind,
    },
};

type CommaList<T> = syn::punctuated::Punctuated<T, Token![,]>;

const CONSTRUCTOR_MODIFIERS: &[&str] = &["public", "private", "protected", "internal", "extern", "unsafe"];
const PARAMETER_MODIFIERS: &[&str] = &["ref", "in", "out", "params", "this", "scoped", "readonly"];

fn peek_word(input: ParseStream) -> Option<String> {
    input.cursor().ident().map(|(ident, _)| ident.to_string())
}

fn peek_word_at(input: ParseStream, n: usize) -> Option<String> {
    let mut cursor = input.cursor();
    for _ in 0..n {
        cursor = cursor.token_tree()?.1;
    }
    cursor.ident().map(|(ident, _)| ident.to_string())
}

fn peek_punct(input: ParseStream, ch: char) -> bool {
    input
        .cursor()
        .punct()
        .is_some_and(|(punct, _)| punct.as_char() == ch)
}

fn parse_word(input: ParseStream) -> syn::Result<syn::Ident> {
    input.call(syn::Ident::parse_any)
}

fn is_group(tree: &TokenTree, delimiter: Delimiter) -> bool {
    matches!(tree, TokenTree::Group(group) if group.delimiter() == delimiter)
}

/// `[]`, `[,]`, ... following a type.
fn peek_rank_specifier(input: ParseStream) -> bool {
    let Some((mut content, _, _)) = input.cursor().group(Delimiter::Bracket) else {
        return false;
    };
    while let Some((punct, next)) = content.punct() {
        if punct.as_char() != ',' {
            return false;
        }
        content = next;
    }
    content.eof()
}

pub(crate) fn parse_type(input: ParseStream) -> syn::Result<TypeRef> {
    let mut ty = if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        let elements = CommaList::parse_terminated_with(&content, parse_tuple_element)?;
        TypeRef::Tuple(elements.into_iter().collect())
    } else {
        parse_named_type(input)?
    };

    loop {
        if peek_punct(input, '?') {
            input.parse::<Token![?]>()?;
            ty = ty.nullable();
        } else if peek_rank_specifier(input) {
            let content;
            syn::bracketed!(content in input);
            let mut rank = 1;
            while !content.is_empty() {
                content.parse::<Token![,]>()?;
                rank += 1;
            }
            ty = TypeRef::Array {
                element: Box::new(ty),
                rank,
            };
        } else if peek_punct(input, '*') {
            return Err(input.error("pointer types are not supported"));
        } else {
            break;
        }
    }

    Ok(ty)
}

fn parse_tuple_element(input: ParseStream) -> syn::Result<TupleElement> {
    let ty = parse_type(input)?;
    let name = if input.peek(syn::Ident::peek_any) {
        Some(parse_word(input)?.to_string())
    } else {
        None
    };

    Ok(TupleElement { ty, name })
}

fn parse_named_type(input: ParseStream) -> syn::Result<TypeRef> {
    let mut global = false;
    if peek_word(input).as_deref() == Some("global") && input.peek2(Token![::]) {
        parse_word(input)?;
        input.parse::<Token![::]>()?;
        global = true;
    }

    let mut segments = vec![];
    loop {
        let name = parse_word(input)?;
        let arguments = if peek_punct(input, '<') {
            parse_type_arguments(input)?
        } else {
            TypeArguments::None
        };
        segments.push(Segment {
            name: name.to_string(),
            arguments,
        });

        if input.peek(Token![::]) {
            input.parse::<Token![::]>()?;
        } else if input.peek(Token![.]) && !input.peek(Token![..]) {
            input.parse::<Token![.]>()?;
        } else {
            break;
        }
    }

    if !global {
        if let [
            Segment {
                name,
                arguments: TypeArguments::None,
            },
        ] = segments.as_slice()
        {
            if let Some(predefined) = Predefined::from_keyword(name) {
                return Ok(TypeRef::Predefined(predefined));
            }
        }
    }

    Ok(TypeRef::Named {
        global,
        segments,
        kind: TypeKind::Unknown,
    })
}

fn parse_type_arguments(input: ParseStream) -> syn::Result<TypeArguments> {
    input.parse::<Token![<]>()?;

    if peek_punct(input, '>') || input.peek(Token![,]) {
        let mut arity = 1;
        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            arity += 1;
        }
        input.parse::<Token![>]>()?;
        return Ok(TypeArguments::Unbound(arity));
    }

    let mut arguments = vec![parse_type(input)?];
    while input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
        arguments.push(parse_type(input)?);
    }
    input.parse::<Token![>]>()?;

    Ok(TypeArguments::Bound(arguments))
}

fn parse_dotted_name(input: ParseStream) -> syn::Result<String> {
    let mut name = parse_word(input)?.to_string();
    while input.peek(Token![.]) {
        input.parse::<Token![.]>()?;
        name.push('.');
        name.push_str(&parse_word(input)?.to_string());
    }
    Ok(name)
}

fn collect_until_comma(input: ParseStream) -> syn::Result<Vec<TokenTree>> {
    let mut tokens = vec![];
    while !input.is_empty() && !input.peek(Token![,]) {
        tokens.push(input.parse::<TokenTree>()?);
    }
    Ok(tokens)
}

pub(crate) fn render_tokens(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut previous_word = false;
    for tree in tokens {
        let word = matches!(tree, TokenTree::Ident(_) | TokenTree::Literal(_));
        if word && previous_word {
            out.push(' ');
        }
        match tree {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::None => ("", ""),
                };
                let inner: Vec<_> = group.stream().into_iter().collect();
                out.push_str(open);
                out.push_str(&render_tokens(&inner));
                out.push_str(close);
            }
            other => out.push_str(&other.to_string()),
        }
        previous_word = word;
    }
    out
}

/// `GenerateMembers.Match | GenerateMembers.Switch` => `[Match, Switch]`
fn flag_names(tokens: &[TokenTree]) -> Vec<String> {
    tokens
        .split(|tree| matches!(tree, TokenTree::Punct(punct) if punct.as_char() == '|'))
        .filter_map(|part| {
            part.iter().rev().find_map(|tree| match tree {
                TokenTree::Ident(ident) => Some(ident.to_string()),
                _ => None,
            })
        })
        .collect()
}

fn parse_attribute_list(input: ParseStream) -> syn::Result<Vec<AttributeSyntax>> {
    let content;
    syn::bracketed!(content in input);

    let mut skip = false;
    if content.peek(syn::Ident::peek_any) && content.peek2(Token![:]) && !content.peek2(Token![::]) {
        let target = parse_word(&content)?;
        content.parse::<Token![:]>()?;
        // `assembly:`, `return:`, ... do not apply to the declaration itself
        skip = target != "type";
    }

    let attributes = CommaList::parse_terminated_with(&content, parse_attribute)?;
    if skip {
        Ok(vec![])
    } else {
        Ok(attributes.into_iter().collect())
    }
}

fn parse_attribute(input: ParseStream) -> syn::Result<AttributeSyntax> {
    let location = Location::from_span(input.span());
    let TypeRef::Named { segments, .. } = parse_named_type(input)? else {
        return Err(syn::Error::new(input.span(), "expected an attribute name"));
    };

    let path = segments.iter().map(|segment| segment.name.clone()).collect();
    let type_arguments = match segments.last().map(|segment| &segment.arguments) {
        Some(TypeArguments::Bound(arguments)) => arguments.clone(),
        _ => vec![],
    };

    let arguments = if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        CommaList::parse_terminated_with(&content, parse_attribute_argument)?
            .into_iter()
            .collect()
    } else {
        vec![]
    };

    Ok(AttributeSyntax {
        path,
        type_arguments,
        arguments,
        location,
    })
}

fn parse_attribute_argument(input: ParseStream) -> syn::Result<AttributeArgumentSyntax> {
    let location = Location::from_span(input.span());

    if input.peek(syn::Ident::peek_any) && input.peek2(Token![=]) && !input.peek2(Token![==]) {
        let name = parse_word(input)?.to_string();
        input.parse::<Token![=]>()?;
        let value = collect_until_comma(input)?;
        return Ok(AttributeArgumentSyntax::Named {
            name,
            flags: flag_names(&value),
            location,
        });
    }

    if peek_word(input).as_deref() == Some("typeof") && input.peek2(syn::token::Paren) {
        parse_word(input)?;
        let content;
        syn::parenthesized!(content in input);
        let ty = parse_type(&content)?;
        if !content.is_empty() {
            return Err(content.error("unexpected tokens after type"));
        }
        if !input.is_empty() && !input.peek(Token![,]) {
            // e.g. `typeof(A).Name`, which is not a type argument
            let mut rest = collect_until_comma(input)?;
            rest.insert(0, TokenTree::Ident(proc_macro2::Ident::new("typeof", input.span())));
            return Ok(AttributeArgumentSyntax::Positional(AttributeArgument::Other {
                text: render_tokens(&rest),
                location,
            }));
        }
        return Ok(AttributeArgumentSyntax::Positional(AttributeArgument::TypeOf {
            ty,
            location,
        }));
    }

    let tokens = collect_until_comma(input)?;
    Ok(AttributeArgumentSyntax::Positional(AttributeArgument::Other {
        text: render_tokens(&tokens),
        location,
    }))
}

fn parse_parameter(input: ParseStream) -> syn::Result<TypeRef> {
    while input.peek(syn::token::Bracket) {
        input.parse::<TokenTree>()?;
    }
    while let Some(word) = peek_word(input) {
        if PARAMETER_MODIFIERS.contains(&word.as_str()) && input.peek2(syn::Ident::peek_any) {
            parse_word(input)?;
        } else {
            break;
        }
    }

    let ty = parse_type(input)?;
    parse_word(input)?;
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        collect_until_comma(input)?;
    }

    Ok(ty)
}

fn parse_parameter_list(tokens: TokenStream) -> syn::Result<Vec<TypeRef>> {
    let parameters = (|input: ParseStream| CommaList::parse_terminated_with(input, parse_parameter))
        .parse2(tokens)?;
    Ok(parameters.into_iter().collect())
}

fn parse_type_parameter_list(input: ParseStream) -> syn::Result<Vec<TypeParameter>> {
    input.parse::<Token![<]>()?;

    let mut parameters = vec![];
    loop {
        while input.peek(syn::token::Bracket) {
            input.parse::<TokenTree>()?;
        }
        if matches!(peek_word(input).as_deref(), Some("in" | "out")) && input.peek2(syn::Ident::peek_any) {
            parse_word(input)?;
        }
        let ident = parse_word(input)?;
        parameters.push(TypeParameter {
            name: ident.to_string(),
            constraints: vec![],
            location: Location::from_span(ident.span()),
        });

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        } else {
            break;
        }
    }
    input.parse::<Token![>]>()?;

    Ok(parameters)
}

fn parse_constraint(input: ParseStream) -> syn::Result<Constraint> {
    let constraint = match peek_word(input).as_deref() {
        Some("class") => {
            parse_word(input)?;
            let nullable = peek_punct(input, '?');
            if nullable {
                input.parse::<Token![?]>()?;
            }
            Constraint::Class { nullable }
        }
        Some("struct") => {
            parse_word(input)?;
            Constraint::Struct
        }
        Some("unmanaged") => {
            parse_word(input)?;
            Constraint::Unmanaged
        }
        Some("notnull") => {
            parse_word(input)?;
            Constraint::NotNull
        }
        Some("default") => {
            parse_word(input)?;
            Constraint::Default
        }
        Some("new") if input.peek2(syn::token::Paren) => {
            parse_word(input)?;
            input.parse::<TokenTree>()?;
            Constraint::New
        }
        _ => Constraint::Type(parse_type(input)?),
    };

    Ok(constraint)
}

fn parse_where_clause(input: ParseStream, parameters: &mut [TypeParameter]) -> syn::Result<()> {
    parse_word(input)?;
    let name = parse_word(input)?;
    input.parse::<Token![:]>()?;

    let mut constraints = vec![parse_constraint(input)?];
    while input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
        constraints.push(parse_constraint(input)?);
    }

    match parameters.iter_mut().find(|parameter| name == parameter.name) {
        Some(parameter) => {
            parameter.constraints.extend(constraints);
            Ok(())
        }
        None => Err(syn::Error::new(
            name.span(),
            format!("`{name}` is not a type parameter of this declaration"),
        )),
    }
}

fn parse_using(input: ParseStream) -> syn::Result<String> {
    parse_word(input)?;

    let mut text = String::new();
    if peek_word(input).as_deref() == Some("static") {
        parse_word(input)?;
        text.push_str("static ");
    }
    if input.peek(syn::Ident::peek_any) && input.peek2(Token![=]) {
        let alias = parse_word(input)?;
        input.parse::<Token![=]>()?;
        text.push_str(&format!("{alias} = "));
    }
    text.push_str(&parse_type(input)?.to_string());
    input.parse::<Token![;]>()?;

    Ok(text)
}

fn skip_past_semicolon(input: ParseStream) -> syn::Result<()> {
    while !input.is_empty() {
        if input.parse::<TokenTree>().is_ok_and(|tree| {
            matches!(tree, TokenTree::Punct(punct) if punct.as_char() == ';')
        }) {
            break;
        }
    }
    Ok(())
}

/// The name of a member, or its signature when the member is a constructor or
/// a method.
fn classify_member(tokens: &[TokenTree], type_name: &str) -> Option<MemberSyntax> {
    let tokens: Vec<&TokenTree> = tokens
        .iter()
        .skip_while(|tree| is_group(tree, Delimiter::Bracket))
        .collect();

    for (i, tree) in tokens.iter().enumerate() {
        match tree {
            TokenTree::Ident(ident) if CONSTRUCTOR_MODIFIERS.iter().any(|m| ident == m) => {}
            TokenTree::Ident(ident) if ident == type_name => {
                if let Some(TokenTree::Group(group)) = tokens.get(i + 1) {
                    if group.delimiter() == Delimiter::Parenthesis {
                        let location = Location::from_span(ident.span());
                        return match parse_parameter_list(group.stream()) {
                            Ok(parameters) => Some(MemberSyntax::Constructor(ConstructorSignature {
                                parameters,
                                location,
                            })),
                            Err(error) => {
                                log::warn!("{location}: skipping constructor of `{type_name}`: {error}");
                                None
                            }
                        };
                    }
                }
                break;
            }
            _ => break,
        }
    }

    let mut depth = 0usize;
    let mut name = None;
    for (i, tree) in tokens.iter().enumerate() {
        match tree {
            TokenTree::Ident(ident) if depth == 0 => name = Some(ident),
            TokenTree::Punct(punct) => match punct.as_char() {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                '=' | ';' if depth == 0 => break,
                _ => {}
            },
            // a tuple type is followed by a name, a parameter list is not
            TokenTree::Group(group)
                if depth == 0
                    && group.delimiter() == Delimiter::Parenthesis
                    && !matches!(tokens.get(i + 1), Some(TokenTree::Ident(_))) =>
            {
                let ident = name?;
                let location = Location::from_span(ident.span());
                return match parse_parameter_list(group.stream()) {
                    Ok(parameters) => Some(MemberSyntax::Method(MethodSignature {
                        name: ident.to_string(),
                        parameters,
                        location,
                    })),
                    Err(error) => {
                        log::warn!("{location}: skipping parameters of `{ident}`: {error}");
                        Some(MemberSyntax::Named(ident.to_string()))
                    }
                };
            }
            TokenTree::Group(group) if group.delimiter() == Delimiter::Parenthesis => {}
            TokenTree::Group(group) if depth == 0 && group.delimiter() != Delimiter::Bracket => break,
            _ => {}
        }
    }
    name.map(|ident| MemberSyntax::Named(ident.to_string()))
}

/// Walks C# source and tracks `#nullable` state as it goes.
pub(crate) struct SourceParser {
    initial: NullableContext,
    nullable: Cell<NullableContext>,
}

impl SourceParser {
    pub(crate) fn new(initial: NullableContext) -> Self {
        Self {
            initial,
            nullable: Cell::new(initial),
        }
    }

    pub(crate) fn parse_unit(&self, input: ParseStream) -> syn::Result<CompilationUnit> {
        let mut unit = CompilationUnit::default();
        self.parse_items(input, &mut unit.usings, &mut unit.items)?;
        Ok(unit)
    }

    fn apply_directive(&self, words: &[String]) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["nullable", _, "warnings"] => {}
            ["nullable", setting, ..] => {
                let context = match *setting {
                    "enable" => NullableContext::Enabled,
                    "disable" => NullableContext::Disabled,
                    "restore" => self.initial,
                    other => {
                        log::warn!("unknown `#nullable` setting `{other}`");
                        return;
                    }
                };
                log::trace!("nullable context is now {context:?}");
                self.nullable.set(context);
            }
            other => log::trace!("skipping `#{}`", other.join(" ")),
        }
    }

    fn parse_directive(&self, input: ParseStream) -> syn::Result<()> {
        let line = input.span().start().line;
        input.parse::<Token![#]>()?;

        // Directives run to the end of the line
        let words = input.step(|cursor| {
            let mut words = vec![];
            let mut rest = *cursor;
            while let Some((tree, next)) = rest.token_tree() {
                if tree.span().start().line != line {
                    break;
                }
                words.push(tree.to_string());
                rest = next;
            }
            Ok((words, rest))
        })?;

        if words.is_empty() {
            return Err(input.error("expected a preprocessor directive"));
        }
        self.apply_directive(&words);
        Ok(())
    }

    /// Finds `#nullable` directives inside a skipped member body.
    fn scan_directives(&self, tokens: TokenStream) {
        let trees: Vec<TokenTree> = tokens.into_iter().collect();
        for (i, tree) in trees.iter().enumerate() {
            match tree {
                TokenTree::Punct(punct) if punct.as_char() == '#' => {
                    let line = punct.span().start().line;
                    let words: Vec<String> = trees[i + 1..]
                        .iter()
                        .take_while(|tree| tree.span().start().line == line)
                        .map(ToString::to_string)
                        .collect();
                    if words.first().is_some_and(|word| word == "nullable") {
                        self.apply_directive(&words);
                    }
                }
                TokenTree::Group(group) => self.scan_directives(group.stream()),
                _ => {}
            }
        }
    }

    /// Skips preprocessor directives and lexed doc comments.
    fn skip_trivia(&self, input: ParseStream) -> syn::Result<()> {
        while peek_punct(input, '#') {
            if input.peek2(syn::token::Bracket) {
                input.parse::<Token![#]>()?;
                input.parse::<TokenTree>()?;
            } else if input.peek2(Token![!]) && input.peek3(syn::token::Bracket) {
                input.parse::<Token![#]>()?;
                input.parse::<Token![!]>()?;
                input.parse::<TokenTree>()?;
            } else {
                self.parse_directive(input)?;
            }
        }
        Ok(())
    }

    fn parse_items(
        &self,
        input: ParseStream,
        usings: &mut Vec<String>,
        items: &mut Vec<Item>,
    ) -> syn::Result<()> {
        loop {
            self.skip_trivia(input)?;
            if input.is_empty() {
                break;
            }

            match peek_word(input).as_deref() {
                Some("using") => usings.push(parse_using(input)?),
                Some("global") if peek_word_at(input, 1).as_deref() == Some("using") => {
                    // global usings already apply to generated files
                    parse_word(input)?;
                    parse_using(input)?;
                }
                Some("extern") if peek_word_at(input, 1).as_deref() == Some("alias") => {
                    skip_past_semicolon(input)?;
                }
                Some("namespace") => items.push(Item::Namespace(self.parse_namespace(input)?)),
                _ => {
                    if peek_type_declaration(input) {
                        items.push(Item::Type(self.parse_type_decl(input)?));
                    } else {
                        let tokens = self.collect_member(input)?;
                        log::debug!("skipping {} tokens outside of a type declaration", tokens.len());
                    }
                }
            }
        }

        Ok(())
    }

    fn parse_namespace(&self, input: ParseStream) -> syn::Result<NamespaceDecl> {
        parse_word(input)?;
        let mut namespace = NamespaceDecl {
            name: parse_dotted_name(input)?,
            usings: vec![],
            items: vec![],
        };

        if input.peek(syn::token::Brace) {
            let content;
            syn::braced!(content in input);
            self.parse_items(&content, &mut namespace.usings, &mut namespace.items)?;
            if input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
            }
        } else {
            // File scoped: the rest of the file belongs to this namespace
            input.parse::<Token![;]>()?;
            self.parse_items(input, &mut namespace.usings, &mut namespace.items)?;
        }

        Ok(namespace)
    }

    fn parse_type_decl(&self, input: ParseStream) -> syn::Result<TypeDecl> {
        let mut attributes = vec![];
        loop {
            self.skip_trivia(input)?;
            if input.peek(syn::token::Bracket) {
                attributes.extend(parse_attribute_list(input)?);
            } else {
                break;
            }
        }

        let nullable_context = self.nullable.get();
        let location = Location::from_span(input.span());

        let mut modifiers = vec![];
        while let Some(modifier) = peek_word(input).and_then(|word| Modifier::from_keyword(&word)) {
            parse_word(input)?;
            modifiers.push(modifier);
        }

        let keyword = parse_word(input)?;
        let kind = match keyword.to_string().as_str() {
            "class" => TypeDeclKind::Type(DeclKind::Class),
            "struct" => TypeDeclKind::Type(DeclKind::Struct),
            "interface" => TypeDeclKind::Type(DeclKind::Interface),
            "enum" => TypeDeclKind::Enum,
            "delegate" => TypeDeclKind::Delegate,
            "record" => match peek_word(input).as_deref() {
                Some("struct") => {
                    parse_word(input)?;
                    TypeDeclKind::Type(DeclKind::RecordStruct)
                }
                Some("class") => {
                    parse_word(input)?;
                    TypeDeclKind::Type(DeclKind::RecordClass)
                }
                _ => TypeDeclKind::Type(DeclKind::RecordClass),
            },
            other => {
                return Err(syn::Error::new(
                    keyword.span(),
                    format!("expected a type declaration, found `{other}`"),
                ));
            }
        };

        if kind == TypeDeclKind::Delegate {
            // return type
            parse_type(input)?;
        }

        let name = parse_word(input)?.to_string();
        let mut type_parameters = if peek_punct(input, '<') {
            parse_type_parameter_list(input)?
        } else {
            vec![]
        };

        let mut members = vec![];
        if input.peek(syn::token::Paren) {
            let location = Location::from_span(input.span());
            let content;
            syn::parenthesized!(content in input);
            let parameters = CommaList::parse_terminated_with(&content, parse_parameter)?;
            if kind != TypeDeclKind::Delegate {
                members.push(MemberSyntax::Constructor(ConstructorSignature {
                    parameters: parameters.into_iter().collect(),
                    location,
                }));
            }
        }

        let mut base_types = vec![];
        if input.peek(Token![:]) && !input.peek(Token![::]) {
            input.parse::<Token![:]>()?;
            loop {
                base_types.push(parse_type(input)?);
                if input.peek(syn::token::Paren) {
                    // record base arguments
                    input.parse::<TokenTree>()?;
                }
                if input.peek(Token![,]) {
                    input.parse::<Token![,]>()?;
                } else {
                    break;
                }
            }
        }

        while peek_word(input).as_deref() == Some("where") {
            parse_where_clause(input, &mut type_parameters)?;
        }

        let mut nested = vec![];
        if input.peek(syn::token::Brace) {
            let content;
            syn::braced!(content in input);
            if kind == TypeDeclKind::Enum {
                content.parse::<TokenStream>()?;
            } else {
                self.parse_body(&content, &name, &mut members, &mut nested)?;
            }
            if input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
            }
        } else {
            input.parse::<Token![;]>()?;
        }

        Ok(TypeDecl {
            attributes,
            modifiers,
            kind,
            name,
            type_parameters,
            base_types,
            members,
            nested,
            nullable_context,
            location,
        })
    }

    fn parse_body(
        &self,
        input: ParseStream,
        type_name: &str,
        members: &mut Vec<MemberSyntax>,
        nested: &mut Vec<TypeDecl>,
    ) -> syn::Result<()> {
        loop {
            self.skip_trivia(input)?;
            if input.is_empty() {
                break;
            }

            if peek_type_declaration(input) {
                nested.push(self.parse_type_decl(input)?);
                continue;
            }

            let tokens = self.collect_member(input)?;
            if let Some(member) = classify_member(&tokens, type_name) {
                members.push(member);
            }
        }

        Ok(())
    }

    /// Consumes one member (or statement) up to its terminating `;` or body.
    fn collect_member(&self, input: ParseStream) -> syn::Result<Vec<TokenTree>> {
        let mut tokens = vec![];
        while !input.is_empty() {
            if input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
                break;
            }

            let tree: TokenTree = input.parse()?;
            let body = match &tree {
                TokenTree::Group(group) if group.delimiter() == Delimiter::Brace => {
                    self.scan_directives(group.stream());
                    true
                }
                _ => false,
            };
            tokens.push(tree);

            if body {
                // `{ get; } = value;`
                if input.peek(Token![=]) && !input.peek(Token![=>]) {
                    continue;
                }
                if input.peek(Token![;]) {
                    input.parse::<Token![;]>()?;
                }
                break;
            }
        }
        Ok(tokens)
    }
}

fn peek_type_declaration(input: ParseStream) -> bool {
    let fork = input.fork();
    loop {
        if fork.peek(syn::token::Bracket) {
            if fork.parse::<TokenTree>().is_err() {
                return false;
            }
            continue;
        }
        if peek_punct(&fork, '#') && fork.peek2(syn::token::Bracket) {
            let _ = fork.parse::<Token![#]>();
            let _ = fork.parse::<TokenTree>();
            continue;
        }

        match peek_word(&fork).as_deref() {
            Some(word) if Modifier::from_keyword(word).is_some() => {
                let _ = parse_word(&fork);
            }
            Some("class" | "struct" | "interface" | "enum" | "delegate") => return true,
            Some("record") => return fork.peek2(syn::Ident::peek_any),
            _ => return false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ty(source: &str) -> TypeRef {
        parse_type.parse_str(source).unwrap()
    }

    #[test]
    fn parse_types() {
        assert_eq!(ty("int"), TypeRef::Predefined(Predefined::Int));
        assert_eq!(ty("int?").to_string(), "int?");
        assert_eq!(ty("string[]").to_string(), "string[]");
        assert_eq!(ty("int[,]").to_string(), "int[,]");
        assert_eq!(
            ty("global::System.Collections.Generic.Dictionary<string, List<int?>>").to_string(),
            "global::System.Collections.Generic.Dictionary<string, List<int?>>"
        );
        assert_eq!(ty("(int Id, string? Name)").to_string(), "(int Id, string? Name)");
        assert!(ty("List<>").is_unbound_generic());
        assert!(ty("Dictionary<,>").is_unbound_generic());
    }

    #[test]
    fn nested_closing_angles() {
        let parsed = ty("A<B<C<int>>>");
        assert_eq!(parsed.to_string(), "A<B<C<int>>>");
    }

    #[test]
    fn pointers_are_rejected() {
        assert!(parse_type.parse_str("int*").is_err());
    }

    #[test]
    fn flags_from_expression() {
        let tokens: Vec<TokenTree> = "GenerateMembers.Match | GenerateMembers.Switch"
            .parse::<TokenStream>()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flag_names(&tokens), vec!["Match", "Switch"]);
    }

    #[test]
    fn members_are_classified() {
        let tokens = |source: &str| -> Vec<TokenTree> {
            source.parse::<TokenStream>().unwrap().into_iter().collect()
        };

        let Some(MemberSyntax::Constructor(constructor)) =
            classify_member(&tokens("public Foo(string value) { }"), "Foo")
        else {
            panic!("expected a constructor");
        };
        assert_eq!(constructor.parameters, vec![TypeRef::Predefined(Predefined::String)]);

        assert_eq!(
            classify_member(&tokens("public Dictionary<int, string> Items { get; }"), "Foo"),
            Some(MemberSyntax::Named("Items".to_string()))
        );
        assert_eq!(
            classify_member(&tokens("public int Count => 0;"), "Foo"),
            Some(MemberSyntax::Named("Count".to_string()))
        );
    }

    #[test]
    fn method_signatures() {
        let method = |source: &str| -> (String, Vec<String>) {
            let tokens: Vec<TokenTree> = source.parse::<TokenStream>().unwrap().into_iter().collect();
            match classify_member(&tokens, "Foo") {
                Some(MemberSyntax::Method(method)) => (
                    method.name,
                    method.parameters.iter().map(ToString::to_string).collect(),
                ),
                other => panic!("expected a method, found {other:?}"),
            }
        };

        assert_eq!(
            method("public override bool Equals(object? obj) => false;"),
            ("Equals".to_string(), vec!["object?".to_string()])
        );
        assert_eq!(
            method("void ISerializable.GetObjectData(SerializationInfo info, StreamingContext context) { }"),
            (
                "GetObjectData".to_string(),
                vec!["SerializationInfo".to_string(), "StreamingContext".to_string()]
            )
        );
        assert_eq!(
            method("public (int, string) Pair() => default;"),
            ("Pair".to_string(), vec![])
        );
        assert_eq!(
            method("public Task<T> Get<T>(int index, CancellationToken token = default) { }"),
            ("Get".to_string(), vec!["int".to_string(), "CancellationToken".to_string()])
        );
        // static constructors are not candidates
        assert_eq!(method("static Foo() { }"), ("Foo".to_string(), vec![]));
    }

    #[test]
    fn render_spacing() {
        let tokens: Vec<TokenTree> = "Foo.Bar(1, \"x\")".parse::<TokenStream>().unwrap().into_iter().collect();
        assert_eq!(render_tokens(&tokens), "Foo.Bar(1,\"x\")");
    }
}
