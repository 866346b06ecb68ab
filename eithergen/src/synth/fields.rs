use super::{INDEX_FIELD, SynthContext, Synthesizer};
use crate::{
    GenerateError,
    cs::{Member, MemberKind, Modifier, types},
};

/// The discriminant and one slot per variant.
pub struct Fields;

impl Synthesizer for Fields {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let modifiers = || vec![Modifier::Private, Modifier::Readonly];

        let mut members = vec![Member::new(
            modifiers(),
            MemberKind::Field {
                ty: types::byte(),
                name: INDEX_FIELD.to_string(),
            },
        )];
        for variant in ctx.variants() {
            members.push(Member::new(
                modifiers(),
                MemberKind::Field {
                    ty: variant.storage_type.clone(),
                    name: variant.field_name(),
                },
            ));
        }
        Ok(members)
    }
}
