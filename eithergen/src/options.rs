use serde::{Deserialize, Serialize};

use crate::cs::PrinterConfig;

/// Which member families are generated for a union.
///
/// Each `switch_*` family is implemented on top of the `match_*` family of the
/// same flavor, so [`GenerateMembers::effective`] turns the matching `match_*`
/// flag on whenever a `switch_*` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateMembers {
    /// `public byte Index`
    pub index_property: bool,
    pub try_pick: bool,
    /// `TryPick(out value, out remainder)`
    pub try_pick_remainder: bool,
    pub match_: bool,
    pub match_with_state: bool,
    pub match_async: bool,
    pub match_async_with_state: bool,
    pub switch: bool,
    pub switch_with_state: bool,
    pub switch_async: bool,
    pub switch_async_with_state: bool,
    /// `Map*`, generic unions only
    pub map: bool,
    /// `Bind*`, generic unions only
    pub bind: bool,
}

impl Default for GenerateMembers {
    fn default() -> Self {
        Self::all()
    }
}

impl GenerateMembers {
    pub const fn all() -> Self {
        Self {
            index_property: true,
            try_pick: true,
            try_pick_remainder: true,
            match_: true,
            match_with_state: true,
            match_async: true,
            match_async_with_state: true,
            switch: true,
            switch_with_state: true,
            switch_async: true,
            switch_async_with_state: true,
            map: true,
            bind: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            index_property: false,
            try_pick: false,
            try_pick_remainder: false,
            match_: false,
            match_with_state: false,
            match_async: false,
            match_async_with_state: false,
            switch: false,
            switch_with_state: false,
            switch_async: false,
            switch_async_with_state: false,
            map: false,
            bind: false,
        }
    }

    /// Builds a selection from the flag names of a C# `GenerateMembers`
    /// expression, e.g. `GenerateMembers.Match | GenerateMembers.Map`.
    /// Unknown names are ignored with a warning.
    pub fn from_flags<S: AsRef<str>>(flags: &[S]) -> Self {
        let mut members = Self::none();
        for flag in flags {
            match flag.as_ref() {
                "All" => members = Self::all(),
                "None" => {}
                "Index" => members.index_property = true,
                "TryPick" => members.try_pick = true,
                "TryPickRemainder" => members.try_pick_remainder = true,
                "Match" => members.match_ = true,
                "MatchWithState" => members.match_with_state = true,
                "MatchAsync" => members.match_async = true,
                "MatchAsyncWithState" => members.match_async_with_state = true,
                "Switch" => members.switch = true,
                "SwitchWithState" => members.switch_with_state = true,
                "SwitchAsync" => members.switch_async = true,
                "SwitchAsyncWithState" => members.switch_async_with_state = true,
                "Map" => members.map = true,
                "Bind" => members.bind = true,
                other => log::warn!("unknown member flag `{other}` is ignored"),
            }
        }
        members
    }

    /// The selection with the `switch_*` => `match_*` coupling applied.
    pub fn effective(mut self) -> Self {
        self.match_ |= self.switch;
        self.match_with_state |= self.switch_with_state;
        self.match_async |= self.switch_async;
        self.match_async_with_state |= self.switch_async_with_state;
        self
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Tool name written into `[GeneratedCode]`.
    pub tool_name: String,
    pub tool_version: String,
    /// Emit the `// <auto-generated/>` banner.
    pub banner: bool,
    /// Annotate members with `[GeneratedCode]`.
    pub generated_code_attribute: bool,
    /// Emit `/// <summary>` documentation on public members.
    pub documentation: bool,
    pub printer: PrinterConfig,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            banner: true,
            generated_code_attribute: true,
            documentation: true,
            printer: PrinterConfig::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_select_families() {
        let members = GenerateMembers::from_flags(&["Match", "Map"]);
        assert!(members.match_);
        assert!(members.map);
        assert!(!members.try_pick);
        assert!(!members.switch);

        assert_eq!(GenerateMembers::from_flags(&["All"]), GenerateMembers::all());
        assert_eq!(GenerateMembers::from_flags::<&str>(&[]), GenerateMembers::none());
    }

    #[test]
    fn unknown_flags_are_ignored() {
        assert_eq!(
            GenerateMembers::from_flags(&["Frobnicate", "Bind"]),
            GenerateMembers {
                bind: true,
                ..GenerateMembers::none()
            }
        );
    }

    #[test]
    fn switch_implies_match() {
        let members = GenerateMembers {
            switch_async_with_state: true,
            ..GenerateMembers::none()
        }
        .effective();
        assert!(members.match_async_with_state);
        assert!(!members.match_);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: GeneratorOptions = serde_json::from_str(r#"{ "banner": false }"#).unwrap();
        assert!(!options.banner);
        assert_eq!(options.tool_name, "eithergen");
        assert_eq!(options.printer.indentation, 4);
    }
}
