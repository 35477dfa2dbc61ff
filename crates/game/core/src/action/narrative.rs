//! Narrative template rendering.

/// Values substituted into a catalog template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NarrativeTokens<'a> {
    pub character: &'a str,
    pub target: Option<&'a str>,
    pub ally: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub ability: Option<&'a str>,
}

impl<'a> NarrativeTokens<'a> {
    fn lookup(&self, token: &str) -> Option<&'a str> {
        match token {
            "character" => Some(self.character),
            "target" => self.target,
            "ally" => self.ally,
            "environment" => self.environment,
            "ability" => self.ability,
            _ => None,
        }
    }
}

/// Replaces `{token}` placeholders in `template`.
///
/// Unknown tokens and tokens without a value are left verbatim. Substituted
/// values are never rescanned.
pub fn render(template: &str, tokens: &NarrativeTokens<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match tokens.lookup(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_tokens() {
        let tokens = NarrativeTokens {
            character: "Brom",
            ally: Some("Ilsa"),
            ..Default::default()
        };
        assert_eq!(
            render("{character} and {ally} coordinate their assault.", &tokens),
            "Brom and Ilsa coordinate their assault."
        );
    }

    #[test]
    fn leaves_missing_and_unknown_tokens() {
        let tokens = NarrativeTokens {
            character: "{ally}",
            ..Default::default()
        };
        assert_eq!(
            render("{character} eyes {target} near {mood", &tokens),
            "{ally} eyes {target} near {mood"
        );
    }
}
