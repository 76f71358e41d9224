//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use fragments_core::{BareType, OwnerId};

/// Pick one supported bare type.
pub fn bare_type() -> impl Strategy<Value = BareType> {
    prop::sample::select(BareType::ALL.to_vec())
}

/// A supported type as a header value: random letter case, optionally with
/// a charset parameter.
pub fn supported_header() -> impl Strategy<Value = String> {
    (bare_type(), any::<bool>(), any::<bool>()).prop_map(|(t, upper, charset)| {
        let mut header = if upper {
            t.as_str().to_ascii_uppercase()
        } else {
            t.as_str().to_owned()
        };
        if charset {
            header.push_str("; charset=utf-8");
        }
        header
    })
}

/// A well-formed header whose bare type is not supported.
pub fn unsupported_header() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["video", "audio", "font", "model", "message"]),
        "[a-z][a-z0-9.+-]{0,11}",
    )
        .prop_map(|(top, sub)| format!("{top}/{sub}"))
}

/// An owner id.
pub fn owner_id() -> impl Strategy<Value = OwnerId> {
    "[a-f0-9]{8,32}".prop_map(OwnerId::from)
}

/// A JSON document that survives a YAML round trip unchanged: integer
/// numbers, and strings that cannot be mistaken for other YAML scalars.
#[derive(Debug, Clone)]
pub struct JsonDoc(pub Value);

impl JsonDoc {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "s[a-zA-Z0-9 _-]{0,16}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("k[a-z0-9_]{0,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

impl Arbitrary for JsonDoc {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::btree_map("k[a-z0-9_]{0,8}", json_value(), 1..6)
            .prop_map(|m| JsonDoc(Value::Object(m.into_iter().collect())))
            .boxed()
    }
}

/// A rectangular CSV table with at least two distinct header names and
/// comma-free fields.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn render(&self) -> String {
        let mut lines = vec![self.header.join(",")];
        lines.extend(self.rows.iter().map(|row| row.join(",")));
        lines.join("\n")
    }

    /// The JSON array a CSV to JSON conversion should produce.
    pub fn expected_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let object: Map<String, Value> = self
                        .header
                        .iter()
                        .cloned()
                        .zip(row.iter().cloned().map(Value::String))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        )
    }
}

impl Arbitrary for CsvTable {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::btree_set("[a-z][a-z0-9_]{0,7}", 2..6)
            .prop_flat_map(|names| {
                let header: Vec<String> = names.into_iter().collect();
                let width = header.len();
                let field = "[A-Za-z0-9][A-Za-z0-9 ]{0,8}[A-Za-z0-9]|[A-Za-z0-9]";
                let row = prop::collection::vec(field, width);
                (Just(header), prop::collection::vec(row, 0..8))
            })
            .prop_map(|(header, rows)| CsvTable { header, rows })
            .boxed()
    }
}
