use super::{SynthContext, Synthesizer, index, public};
use crate::{
    GenerateError,
    cs::{Body, Member, MemberKind, types},
};

pub struct IndexProperty;

impl Synthesizer for IndexProperty {
    fn name(&self) -> &'static str {
        "index"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        ctx.members.index_property && !ctx.union.declaration.declares_member("Index")
    }

    fn synthesize(&self, _ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        Ok(vec![
            Member::new(
                public(),
                MemberKind::Property {
                    ty: types::byte(),
                    name: "Index".to_string(),
                    body: Body::Expr(index()),
                },
            )
            .with_doc("The 1-based index of the held variant, or 0 for a default instance."),
        ])
    }
}
