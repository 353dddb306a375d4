//! Runtime expression grammar
//!
//! ```text
//! expression = ( "$url" / "$method" / "$statusCode"
//!              / "$request." source / "$response." source / "$message." source
//!              / "$inputs." name / "$outputs." name / "$steps." name
//!              / "$workflows." name / "$sourceDescriptions." name
//!              / "$components.parameters." name / "$components." name )
//! source     = header-reference / query-reference / path-reference / body-reference
//! header-reference = "header." token
//! query-reference  = "query." name
//! path-reference   = "path." name
//! body-reference   = "body" [ "#" json-pointer ]
//! json-pointer     = *( "/" reference-token )
//! reference-token  = *( unescaped / escaped )
//! escaped          = "~" ( "0" / "1" )
//! name             = 1*( %x21-7E )
//! token            = 1*tchar
//! ```
//!
//! Alternatives are tried in the order above; `$components.parameters.` is
//! listed before `$components.` so the longer literal wins. Once a root
//! literal matches, the rest of the input must satisfy that root's rule.

use arazzo_ast::Span;
use serde::Serialize;
use tracing::debug;

use crate::{decode_token, Expectation, JsonPointer, Location, SyntaxError};

/// A parsed runtime expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RuntimeExpression {
    Url,
    Method,
    StatusCode,
    Request(Source),
    Response(Source),
    Message(Source),
    Inputs(String),
    Outputs(String),
    /// Everything after `$steps.`, e.g. `createRobot.outputs.robotId`
    Steps(String),
    Workflows(String),
    SourceDescriptions(String),
    Components(String),
    ComponentParameters(String),
}

impl RuntimeExpression {
    /// The canonical spelling of the root keyword
    pub fn root(&self) -> &'static str {
        match self {
            RuntimeExpression::Url => "$url",
            RuntimeExpression::Method => "$method",
            RuntimeExpression::StatusCode => "$statusCode",
            RuntimeExpression::Request(_) => "$request.",
            RuntimeExpression::Response(_) => "$response.",
            RuntimeExpression::Message(_) => "$message.",
            RuntimeExpression::Inputs(_) => "$inputs.",
            RuntimeExpression::Outputs(_) => "$outputs.",
            RuntimeExpression::Steps(_) => "$steps.",
            RuntimeExpression::Workflows(_) => "$workflows.",
            RuntimeExpression::SourceDescriptions(_) => "$sourceDescriptions.",
            RuntimeExpression::Components(_) => "$components.",
            RuntimeExpression::ComponentParameters(_) => "$components.parameters.",
        }
    }
}

/// Where inside a request, response or message a value is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Source {
    Header(String),
    Query(String),
    Path(String),
    /// `body` with an optional `#/json/pointer`; `None` means no `#` was given
    Body(Option<JsonPointer>),
}

/// Parse a runtime expression, consuming the whole input
pub fn parse(expression: &str) -> Result<RuntimeExpression, SyntaxError> {
    let mut grammar = Grammar::new(expression);
    let result = grammar.expression();

    match result {
        Some(parsed) if grammar.at_end() => {
            debug!(expression, root = parsed.root(), "parsed runtime expression");
            Ok(parsed)
        }
        Some(_) => {
            grammar.fail(Expectation::End);
            Err(grammar.error())
        }
        None => Err(grammar.error()),
    }
}

const TCHAR: &str = "[!#$%&'*+-.^_`|~0-9A-Za-z]";
const NAME_CHAR: &str = "[\\x21-\\x7E]";
const UNESCAPED: &str = "[^/~]";
const ESCAPE_DIGIT: &str = "[01]";

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_name_char(c: char) -> bool {
    ('\x21'..='\x7e').contains(&c)
}

fn is_unescaped(c: char) -> bool {
    c != '/' && c != '~'
}

struct Grammar<'a> {
    input: &'a str,
    pos: usize,
    max_fail_pos: usize,
    expected: Vec<Expectation>,
}

impl<'a> Grammar<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            max_fail_pos: 0,
            expected: Vec::new(),
        }
    }

    // === Utilities ===

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Record an expectation at the current position, keeping only the furthest ones
    fn fail(&mut self, expectation: Expectation) {
        if self.pos < self.max_fail_pos {
            return;
        }
        if self.pos > self.max_fail_pos {
            self.max_fail_pos = self.pos;
            self.expected.clear();
        }
        if !self.expected.contains(&expectation) {
            self.expected.push(expectation);
        }
    }

    fn literal(&mut self, text: &'static str, ignore_case: bool) -> bool {
        let matched = self
            .input
            .get(self.pos..self.pos + text.len())
            .map(|slice| {
                if ignore_case {
                    slice.eq_ignore_ascii_case(text)
                } else {
                    slice == text
                }
            })
            .unwrap_or(false);

        if matched {
            self.pos += text.len();
        } else {
            self.fail(Expectation::Literal { text, ignore_case });
        }
        matched
    }

    fn keyword(&mut self, text: &'static str) -> bool {
        self.literal(text, true)
    }

    fn class(&mut self, pred: fn(char) -> bool, description: &'static str) -> Option<char> {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                Some(c)
            }
            _ => {
                self.fail(Expectation::Class(description));
                None
            }
        }
    }

    fn error(&self) -> SyntaxError {
        let found = self.input[self.max_fail_pos..].chars().next();
        let span = match found {
            Some(c) => Span::new(self.max_fail_pos, self.max_fail_pos + c.len_utf8()),
            None => Span::point(self.max_fail_pos),
        };
        let mut expected = self.expected.clone();
        expected.sort_by_key(|e| e.to_string());
        SyntaxError {
            expected,
            found,
            location: Location::at(self.input, self.max_fail_pos),
            span,
        }
    }

    // === Rules ===

    fn expression(&mut self) -> Option<RuntimeExpression> {
        if self.keyword("$url") {
            return Some(RuntimeExpression::Url);
        }
        if self.keyword("$method") {
            return Some(RuntimeExpression::Method);
        }
        if self.keyword("$statusCode") {
            return Some(RuntimeExpression::StatusCode);
        }
        if self.keyword("$request.") {
            return self.source().map(RuntimeExpression::Request);
        }
        if self.keyword("$response.") {
            return self.source().map(RuntimeExpression::Response);
        }
        if self.keyword("$message.") {
            return self.source().map(RuntimeExpression::Message);
        }
        if self.keyword("$inputs.") {
            return self.name().map(RuntimeExpression::Inputs);
        }
        if self.keyword("$outputs.") {
            return self.name().map(RuntimeExpression::Outputs);
        }
        if self.keyword("$steps.") {
            return self.name().map(RuntimeExpression::Steps);
        }
        if self.keyword("$workflows.") {
            return self.name().map(RuntimeExpression::Workflows);
        }
        if self.keyword("$sourceDescriptions.") {
            return self.name().map(RuntimeExpression::SourceDescriptions);
        }
        if self.keyword("$components.parameters.") {
            return self.name().map(RuntimeExpression::ComponentParameters);
        }
        if self.keyword("$components.") {
            return self.name().map(RuntimeExpression::Components);
        }
        None
    }

    fn source(&mut self) -> Option<Source> {
        let start = self.pos;

        if self.keyword("header.") {
            if let Some(token) = self.token() {
                return Some(Source::Header(token));
            }
            self.pos = start;
        }
        if self.keyword("query.") {
            if let Some(name) = self.name() {
                return Some(Source::Query(name));
            }
            self.pos = start;
        }
        if self.keyword("path.") {
            if let Some(name) = self.name() {
                return Some(Source::Path(name));
            }
            self.pos = start;
        }
        if self.keyword("body") {
            let pointer = if self.literal("#", false) {
                Some(self.json_pointer())
            } else {
                None
            };
            return Some(Source::Body(pointer));
        }
        None
    }

    fn name(&mut self) -> Option<String> {
        let start = self.pos;
        while self.class(is_name_char, NAME_CHAR).is_some() {}
        if self.pos == start {
            None
        } else {
            Some(self.input[start..self.pos].to_string())
        }
    }

    fn token(&mut self) -> Option<String> {
        let start = self.pos;
        while self.class(is_tchar, TCHAR).is_some() {}
        if self.pos == start {
            None
        } else {
            Some(self.input[start..self.pos].to_string())
        }
    }

    fn json_pointer(&mut self) -> JsonPointer {
        let mut tokens = Vec::new();
        while self.literal("/", false) {
            tokens.push(self.reference_token());
        }
        JsonPointer::new(tokens)
    }

    fn reference_token(&mut self) -> String {
        let start = self.pos;
        while self.class(is_unescaped, UNESCAPED).is_some() || self.escaped() {}
        let raw = &self.input[start..self.pos];
        decode_token(raw).unwrap_or_else(|| raw.to_string())
    }

    fn escaped(&mut self) -> bool {
        let start = self.pos;
        if !self.literal("~", false) {
            return false;
        }
        if self.class(|c| c == '0' || c == '1', ESCAPE_DIGIT).is_none() {
            self.pos = start;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_pointer(expression: &str) -> Vec<String> {
        match parse(expression) {
            Ok(RuntimeExpression::Response(Source::Body(Some(pointer)))) => pointer.tokens,
            other => panic!("Expected response body pointer, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_roots() {
        assert_eq!(parse("$url").unwrap(), RuntimeExpression::Url);
        assert_eq!(parse("$method").unwrap(), RuntimeExpression::Method);
        assert_eq!(parse("$statusCode").unwrap(), RuntimeExpression::StatusCode);
    }

    #[test]
    fn test_root_keywords_ignore_case() {
        assert_eq!(parse("$STATUSCODE").unwrap(), RuntimeExpression::StatusCode);
        assert_eq!(
            parse("$Steps.createRobot.outputs.robotId").unwrap(),
            RuntimeExpression::Steps("createRobot.outputs.robotId".to_string())
        );
    }

    #[test]
    fn test_names_keep_case() {
        assert_eq!(
            parse("$inputs.RobotName").unwrap(),
            RuntimeExpression::Inputs("RobotName".to_string())
        );
    }

    #[test]
    fn test_sources() {
        assert_eq!(
            parse("$request.header.X-API-Key").unwrap(),
            RuntimeExpression::Request(Source::Header("X-API-Key".to_string()))
        );
        assert_eq!(
            parse("$request.query.limit").unwrap(),
            RuntimeExpression::Request(Source::Query("limit".to_string()))
        );
        assert_eq!(
            parse("$request.path.robotId").unwrap(),
            RuntimeExpression::Request(Source::Path("robotId".to_string()))
        );
        assert_eq!(
            parse("$response.body").unwrap(),
            RuntimeExpression::Response(Source::Body(None))
        );
        assert_eq!(
            parse("$message.body#/id").unwrap(),
            RuntimeExpression::Message(Source::Body(Some(JsonPointer::new(vec!["id".into()]))))
        );
    }

    #[test]
    fn test_body_pointer_unescapes() {
        assert_eq!(body_pointer("$response.body#/a/b~1c"), vec!["a", "b/c"]);
        assert_eq!(body_pointer("$response.body#/x~0y"), vec!["x~y"]);
        assert_eq!(body_pointer("$response.body#/robotId"), vec!["robotId"]);
        assert!(body_pointer("$response.body#").is_empty());
        assert_eq!(body_pointer("$response.body#/items/0"), vec!["items", "0"]);
    }

    #[test]
    fn test_components_parameters_wins_over_components() {
        assert_eq!(
            parse("$components.parameters.limit").unwrap(),
            RuntimeExpression::ComponentParameters("limit".to_string())
        );
        assert_eq!(
            parse("$components.schemas").unwrap(),
            RuntimeExpression::Components("schemas".to_string())
        );
    }

    #[test]
    fn test_matched_root_does_not_fall_back() {
        // `$components.parameters.` matched, so an empty name fails the whole parse
        let err = parse("$components.parameters.").unwrap_err();
        assert_eq!(err.found, None);
        assert!(err.expected.contains(&Expectation::Class(NAME_CHAR)));
    }

    #[test]
    fn test_unknown_root_fails_with_expectations() {
        let err = parse("response.body").unwrap_err();
        assert_eq!(err.found, Some('r'));
        assert_eq!(err.location.offset, 0);
        assert!(err.expected.len() >= 13);
        assert!(err.expected.contains(&Expectation::Literal {
            text: "$statusCode",
            ignore_case: true,
        }));
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        let err = parse("$statusCodes").unwrap_err();
        assert_eq!(err.found, Some('s'));
        assert_eq!(err.location.column, 12);
        assert_eq!(err.expected, vec![Expectation::End]);

        let err = parse("$response.bodyx").unwrap_err();
        assert_eq!(err.found, Some('x'));
        assert!(err.expected.contains(&Expectation::End));
        assert!(err.expected.contains(&Expectation::Literal {
            text: "#",
            ignore_case: false,
        }));
    }

    #[test]
    fn test_bad_pointer_escape() {
        let err = parse("$response.body#/a~2").unwrap_err();
        assert_eq!(err.found, Some('2'));
        assert!(err.expected.contains(&Expectation::Class(ESCAPE_DIGIT)));
    }

    #[test]
    fn test_header_requires_token() {
        let err = parse("$response.header.").unwrap_err();
        assert_eq!(err.found, None);
        assert!(err.expected.contains(&Expectation::Class(TCHAR)));

        // a space is not a token character
        assert!(parse("$response.header.X Y").is_err());
    }

    #[test]
    fn test_names_stop_at_non_visible_chars() {
        assert!(parse("$steps.a.outputs.b c").is_err());
        assert!(parse("$inputs.").is_err());
        assert!(parse("$inputs.caf\u{e9}").is_err());
    }

    #[test]
    fn test_empty_input() {
        let err = parse("").unwrap_err();
        assert_eq!(err.found, None);
        assert!(!err.expected.is_empty());
        assert_eq!(err.span, Span::point(0));
    }

    #[test]
    fn test_non_ascii_pointer_tokens() {
        assert_eq!(body_pointer("$response.body#/caf\u{e9}"), vec!["caf\u{e9}"]);
    }
}
