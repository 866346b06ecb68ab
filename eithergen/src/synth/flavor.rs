use eithergen_syntax::model::TypeRef;

use crate::{
    GenerateMembers,
    cs::{Expr, Param, types},
};

pub(crate) const STATE: &str = "state";
pub(crate) const CANCELLATION_TOKEN: &str = "cancellationToken";

/// One of the four shapes of the continuation-taking families: with or
/// without a caller-supplied state, synchronous or task-returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flavor {
    pub with_state: bool,
    pub is_async: bool,
}

impl Flavor {
    pub const ALL: [Flavor; 4] = [
        Flavor {
            with_state: false,
            is_async: false,
        },
        Flavor {
            with_state: true,
            is_async: false,
        },
        Flavor {
            with_state: false,
            is_async: true,
        },
        Flavor {
            with_state: true,
            is_async: true,
        },
    ];

    /// `Match`, `MatchAsync`, ...
    pub fn name(self, base: &str) -> String {
        if self.is_async {
            format!("{base}Async")
        } else {
            base.to_string()
        }
    }

    pub fn match_selected(self, members: &GenerateMembers) -> bool {
        match (self.with_state, self.is_async) {
            (false, false) => members.match_,
            (true, false) => members.match_with_state,
            (false, true) => members.match_async,
            (true, true) => members.match_async_with_state,
        }
    }

    pub fn switch_selected(self, members: &GenerateMembers) -> bool {
        match (self.with_state, self.is_async) {
            (false, false) => members.switch,
            (true, false) => members.switch_with_state,
            (false, true) => members.switch_async,
            (true, true) => members.switch_async_with_state,
        }
    }

    /// The delegate type of a continuation receiving `input`. `output` of
    /// `None` is a continuation without a result.
    pub fn continuation(
        self,
        state: Option<&TypeRef>,
        input: TypeRef,
        output: Option<TypeRef>,
    ) -> TypeRef {
        let mut inputs = vec![];
        if self.with_state {
            inputs.extend(state.cloned());
        }
        inputs.push(input);

        if self.is_async {
            inputs.push(types::cancellation_token());
            types::func(inputs, types::task(output))
        } else {
            match output {
                Some(output) => types::func(inputs, output),
                None => types::action(inputs),
            }
        }
    }

    /// The return type of the member itself.
    pub fn returns(self, output: Option<TypeRef>) -> Option<TypeRef> {
        if self.is_async {
            Some(types::task(output))
        } else {
            output
        }
    }

    /// The state parameter, when this flavor takes one.
    pub fn leading(self, state: Option<&TypeRef>) -> Vec<Param> {
        match state {
            Some(state) if self.with_state => vec![Param::new(state.clone(), STATE)],
            _ => vec![],
        }
    }

    /// The cancellation token parameter, when this flavor takes one.
    pub fn trailing(self) -> Vec<Param> {
        if self.is_async {
            vec![
                Param::new(types::cancellation_token(), CANCELLATION_TOKEN)
                    .with_default(Expr::default_value()),
            ]
        } else {
            vec![]
        }
    }

    /// Arguments for a continuation call.
    pub fn arguments(self, state: &str, value: Expr, token: &str) -> Vec<Expr> {
        let mut arguments = vec![];
        if self.with_state {
            arguments.push(Expr::ident(state));
        }
        arguments.push(value);
        if self.is_async {
            arguments.push(Expr::ident(token));
        }
        arguments
    }

    /// Calls `target` with the member's own state and token.
    pub fn invoke(self, target: &str, value: Expr) -> Expr {
        Expr::ident(target).call(self.arguments(STATE, value, CANCELLATION_TOKEN))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn continuation_types() {
        let state = types::parameter("TState");
        let result = Some(types::parameter("TResult"));
        let flavors: Vec<String> = Flavor::ALL
            .iter()
            .map(|flavor| {
                flavor
                    .continuation(Some(&state), types::int(), result.clone())
                    .to_string()
            })
            .collect();
        assert_eq!(
            flavors,
            [
                "global::System.Func<int, TResult>",
                "global::System.Func<TState, int, TResult>",
                "global::System.Func<int, global::System.Threading.CancellationToken, global::System.Threading.Tasks.Task<TResult>>",
                "global::System.Func<TState, int, global::System.Threading.CancellationToken, global::System.Threading.Tasks.Task<TResult>>",
            ]
        );
    }

    #[test]
    fn actions_without_output() {
        let flavor = Flavor::ALL[0];
        assert_eq!(
            flavor.continuation(None, types::int(), None).to_string(),
            "global::System.Action<int>"
        );
        let flavor = Flavor::ALL[2];
        assert_eq!(
            flavor.continuation(None, types::int(), None).to_string(),
            "global::System.Func<int, global::System.Threading.CancellationToken, global::System.Threading.Tasks.Task>"
        );
    }
}
