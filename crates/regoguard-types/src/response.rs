//! Policy evaluation responses as handed back to admission callers.
//!
//! Evaluation itself happens elsewhere; these types carry its outcome and render the
//! human-readable trace dump used when debugging a template.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One violation reported by a policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,

    /// Contents of `details` from the rule head.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, JsonValue>,

    /// The constraint that was violated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<JsonValue>,

    /// The violating review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<JsonValue>,

    /// The violating resource, filled in by the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,
}

/// Results produced for a single target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Evaluation trace; `None` when tracing was disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    /// Rendered evaluation input; `None` when tracing was disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub target: String,
    #[serde(default)]
    pub results: Vec<PolicyResult>,
}

impl Response {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn trace_dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "Target: {}", self.target);
        write_traced(&mut out, "Input", self.input.as_deref());
        write_traced(&mut out, "Trace", self.trace.as_deref());
        for (i, result) in self.results.iter().enumerate() {
            let _ = write!(out, "Result({i}):\n{result:#?}\n\n");
        }
        out
    }
}

fn write_traced(out: &mut String, label: &str, value: Option<&str>) {
    let _ = match value {
        None => write!(out, "{label}: TRACING DISABLED\n\n"),
        Some(v) => write!(out, "{label}:\n{v}\n\n"),
    };
}

/// Responses keyed by target name, iterated in target order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses(pub BTreeMap<String, Response>);

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the response's own target, replacing any previous entry.
    pub fn insert(&mut self, response: Response) -> Option<Response> {
        self.0.insert(response.target.clone(), response)
    }

    pub fn get(&self, target: &str) -> Option<&Response> {
        self.0.get(target)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every result across all targets.
    pub fn results(&self) -> Vec<&PolicyResult> {
        self.0.values().flat_map(|r| r.results.iter()).collect()
    }

    pub fn trace_dump(&self) -> String {
        let mut out = String::new();
        for response in self.0.values() {
            out.push_str(&response.trace_dump());
            out.push_str("\n\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(msg: &str) -> PolicyResult {
        PolicyResult {
            msg: msg.to_string(),
            ..PolicyResult::default()
        }
    }

    #[test]
    fn dump_marks_disabled_tracing() {
        let dump = Response::new("admission.k8s.gatekeeper.sh").trace_dump();
        assert_eq!(
            dump,
            "Target: admission.k8s.gatekeeper.sh\n\
             Input: TRACING DISABLED\n\n\
             Trace: TRACING DISABLED\n\n"
        );
    }

    #[test]
    fn dump_includes_trace_input_and_numbered_results() {
        let response = Response {
            trace: Some("Enter data.x".into()),
            input: Some("{\"a\": 1}".into()),
            target: "t".into(),
            results: vec![result("first"), result("second")],
        };
        let dump = response.trace_dump();
        assert!(dump.starts_with("Target: t\nInput:\n{\"a\": 1}\n\nTrace:\nEnter data.x\n\n"));
        assert!(dump.contains("Result(0):\nPolicyResult {"));
        assert!(dump.contains("msg: \"first\""));
        assert!(dump.contains("Result(1):\n"));
        assert!(dump.ends_with("}\n\n"));
    }

    #[test]
    fn results_flatten_across_targets_in_target_order() {
        let mut responses = Responses::new();
        let mut b = Response::new("b");
        b.results = vec![result("b1")];
        let mut a = Response::new("a");
        a.results = vec![result("a1"), result("a2")];
        responses.insert(b);
        responses.insert(a);

        let msgs: Vec<&str> = responses.results().iter().map(|r| r.msg.as_str()).collect();
        assert_eq!(msgs, vec!["a1", "a2", "b1"]);

        let dump = responses.trace_dump();
        let a_at = dump.find("Target: a").expect("a dumped");
        let b_at = dump.find("Target: b").expect("b dumped");
        assert!(a_at < b_at);
    }

    #[test]
    fn empty_responses_dump_nothing() {
        let responses = Responses::new();
        assert!(responses.results().is_empty());
        assert_eq!(responses.trace_dump(), "");
    }

    #[test]
    fn result_json_omits_empty_fields() {
        let r = PolicyResult {
            msg: "denied".into(),
            metadata: BTreeMap::from([("details".to_string(), json!({"missing": ["team"]}))]),
            ..PolicyResult::default()
        };
        let v = serde_json::to_value(&r).expect("serialize");
        assert_eq!(v, json!({"msg": "denied", "metadata": {"details": {"missing": ["team"]}}}));
    }
}
