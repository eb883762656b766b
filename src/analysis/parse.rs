use std::collections::HashMap;

/// The labelled lines a completion is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Impact,
    Eco1,
    Eco2,
    Ingredient,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Impact, Label::Eco1, Label::Eco2, Label::Ingredient];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Impact => "IMPACT",
            Label::Eco1 => "ECO1",
            Label::Eco2 => "ECO2",
            Label::Ingredient => "INGREDIENT",
        }
    }

    /// Placeholder used when the label is missing or the request failed.
    pub fn fallback(self) -> &'static str {
        match self {
            Label::Impact => "Unable to analyze environmental impact, please rescan",
            Label::Eco1 => "Eco-friendly alternative unavailable, please rescan",
            Label::Eco2 => "Budget alternative unavailable, please rescan",
            Label::Ingredient => "Unable to analyze ingredients, please rescan",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Label::Impact => "⚠️",
            Label::Eco1 => "🌱",
            Label::Eco2 => "💰",
            Label::Ingredient => "🧪",
        }
    }

    pub fn annotate(self, value: &str) -> String {
        format!("{} {}", self.emoji(), value)
    }

    /// Value of `line` if it starts with `<LABEL>:` in any case.
    fn value_in<'a>(self, line: &'a str) -> Option<&'a str> {
        // Models like to wrap labels in markdown ("**IMPACT:**", "- ECO1:").
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '-' | '#'));
        let label = self.as_str();
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let rest = line[label.len()..].trim_start_matches('*').trim_start();
        rest.strip_prefix(':')
            .map(|v| v.trim_matches(|c: char| c.is_whitespace() || c == '*'))
    }
}

/// Raw label values extracted from a completion, before any defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLabels {
    values: HashMap<Label, String>,
}

impl ParsedLabels {
    pub fn get(&self, label: Label) -> Option<&str> {
        self.values.get(&label).map(String::as_str)
    }

    pub fn missing(&self) -> Vec<Label> {
        Label::ALL
            .into_iter()
            .filter(|l| !self.values.contains_key(l))
            .collect()
    }

    /// Value for `label`, or its fallback text.
    pub fn value_or_default(&self, label: Label) -> &str {
        self.get(label).unwrap_or_else(|| label.fallback())
    }
}

/// Scan `text` line by line for each label. The first matching line wins;
/// empty values count as missing. Labels are independent of each other.
pub fn extract_labels(text: &str) -> ParsedLabels {
    let mut values = HashMap::new();
    for label in Label::ALL {
        let value = text
            .lines()
            .filter_map(|line| label.value_in(line))
            .next()
            .filter(|v| !v.is_empty());
        if let Some(v) = value {
            values.insert(label, v.to_string());
        }
    }
    ParsedLabels { values }
}
