//! Typed filter graph builder.
//!
//! A graph is an ordered list of named chains. Each chain reads from zero or
//! more labelled pads, applies filters in order and writes to zero or more
//! labelled pads. Nothing is turned into ffmpeg syntax until [`FilterGraph::render`].

use std::fmt::Write;

#[derive(Clone, Debug, PartialEq)]
enum OptionValue {
    /// Emitted verbatim. Only for values without filter syntax characters.
    Raw(String),
    /// Arithmetic expression, emitted inside single quotes.
    Expr(String),
    /// Free text, escaped for both the graph and the option parser.
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    name: String,
    options: Vec<(String, OptionValue)>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.options
            .push((key.into(), OptionValue::Raw(value.to_string())));
        self
    }

    pub fn expr(mut self, key: impl Into<String>, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        debug_assert!(!expr.contains('\''), "expressions cannot contain quotes");
        self.options.push((key.into(), OptionValue::Expr(expr)));
        self
    }

    pub fn text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push((key.into(), OptionValue::Text(text.into())));
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.name);
        for (i, (key, value)) in self.options.iter().enumerate() {
            out.push(if i == 0 { '=' } else { ':' });
            out.push_str(key);
            out.push('=');
            match value {
                OptionValue::Raw(v) => out.push_str(v),
                OptionValue::Expr(v) => {
                    let _ = write!(out, "'{}'", v);
                }
                OptionValue::Text(v) => out.push_str(&escape_text(v)),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterChain {
    stage: String,
    inputs: Vec<String>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            inputs: Vec::new(),
            filters: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, label: impl Into<String>) -> Self {
        self.inputs.push(label.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.outputs.push(label.into());
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    fn render(&self, out: &mut String) {
        for label in &self.inputs {
            let _ = write!(out, "[{}]", label);
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            filter.render(out);
        }
        for label in &self.outputs {
            let _ = write!(out, "[{}]", label);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn push(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    pub fn chains(&self) -> &[FilterChain] {
        &self.chains
    }

    /// Label written by the last chain, if it has one.
    pub fn final_output(&self) -> Option<&str> {
        self.chains
            .last()
            .and_then(|c| c.outputs.last())
            .map(String::as_str)
    }

    /// Serialise into the engine's filter graph syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            chain.render(&mut out);
        }
        out
    }
}

/// Escape text so it survives the option parser (`\ ' :`) and then the graph
/// parser (`\ ' [ ] , ;`).
pub fn escape_text(raw: &str) -> String {
    escape_with(&escape_with(raw, &['\\', '\'', ':']), &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_with(raw: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
