//! Debug JSON rendering.
//!
//! Types without a natural textual form emit `$`-prefixed placeholder
//! objects, consistently across the whole document. Binary payloads render
//! as `data:` URI strings; non-finite doubles render as `$numberDouble`
//! wrappers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Number, Value};

use crate::document::Document;
use crate::eager::{EagerDocument, OwnedValue, MAX_DEPTH};
use crate::error::BsonError;
use crate::value::BsonValue;

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut s = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        s.push(HEX[(b >> 4) as usize] as char);
        s.push(HEX[(b & 0x0f) as usize] as char);
    }
    s
}

fn double_json(f: f64) -> Value {
    if f.is_nan() {
        json!({ "$numberDouble": "NaN" })
    } else if f == f64::INFINITY {
        json!({ "$numberDouble": "Infinity" })
    } else if f == f64::NEG_INFINITY {
        json!({ "$numberDouble": "-Infinity" })
    } else {
        match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => json!({ "$numberDouble": f.to_string() }),
        }
    }
}

fn binary_json(data: &[u8]) -> Value {
    Value::String(format!(
        "data:application/octet-stream;base64,{}",
        STANDARD.encode(data)
    ))
}

pub(crate) fn document_to_json(doc: &Document<'_>) -> Result<String, BsonError> {
    document_json(doc, 0).map(|v| v.to_string())
}

fn document_json(doc: &Document<'_>, depth: usize) -> Result<Value, BsonError> {
    if depth > MAX_DEPTH {
        return Err(BsonError::DepthLimitExceeded(MAX_DEPTH));
    }
    let mut map = Map::new();
    for (name, value) in doc.entries()? {
        let rendered = value_json(value, depth).map_err(|e| e.in_field(name))?;
        map.insert(name.to_string(), rendered);
    }
    Ok(Value::Object(map))
}

fn value_json(value: &BsonValue<'_>, depth: usize) -> Result<Value, BsonError> {
    Ok(match value {
        BsonValue::Double(f) => double_json(*f),
        BsonValue::Str(s) => Value::String(s.to_string()),
        BsonValue::Document(doc) => document_json(doc, depth + 1)?,
        BsonValue::Array(arr) => {
            let mut items = Vec::with_capacity(arr.len());
            for item in arr.iter() {
                items.push(value_json(item?, depth + 1)?);
            }
            Value::Array(items)
        }
        BsonValue::Binary(bin) => binary_json(bin.data),
        BsonValue::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        BsonValue::Boolean(b) => Value::Bool(*b),
        BsonValue::DateTime(ms) => json!({ "$date": ms }),
        BsonValue::Null => Value::Null,
        BsonValue::Regex(re) => json!({ "$regex": re.pattern, "$options": re.options }),
        BsonValue::DbPointer(ptr) => {
            json!({ "$dbPointer": { "$ref": ptr.name, "$id": { "$oid": ptr.id.to_hex() } } })
        }
        BsonValue::JavaScript(code) => json!({ "$code": code }),
        BsonValue::Symbol(s) => json!({ "$symbol": s }),
        BsonValue::JavaScriptWithScope(cws) => {
            json!({ "$code": cws.code, "$scope": document_json(&cws.scope, depth + 1)? })
        }
        BsonValue::Int32(i) => json!(i),
        BsonValue::Timestamp(ts) => {
            json!({ "$timestamp": { "t": ts.seconds, "i": ts.increment } })
        }
        BsonValue::Int64(i) => json!(i),
        BsonValue::Decimal128(d) => json!({ "$decimal128": hex_lower(d.bytes()) }),
        BsonValue::MinKey => json!({ "$minKey": 1 }),
        BsonValue::MaxKey => json!({ "$maxKey": 1 }),
    })
}

pub(crate) fn eager_to_json(doc: &EagerDocument) -> String {
    owned_fields_json(doc.fields()).to_string()
}

pub(crate) fn owned_fields_json(fields: &[(String, OwnedValue)]) -> Value {
    let mut map = Map::new();
    for (name, value) in fields {
        map.insert(name.clone(), owned_value_json(value));
    }
    Value::Object(map)
}

fn owned_value_json(value: &OwnedValue) -> Value {
    match value {
        OwnedValue::Double(f) => double_json(*f),
        OwnedValue::Str(s) => Value::String(s.clone()),
        OwnedValue::Document(fields) => owned_fields_json(fields),
        OwnedValue::Array(items) => Value::Array(items.iter().map(owned_value_json).collect()),
        OwnedValue::Binary { data, .. } => binary_json(data),
        OwnedValue::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        OwnedValue::Boolean(b) => Value::Bool(*b),
        OwnedValue::DateTime(ms) => json!({ "$date": ms }),
        OwnedValue::Null => Value::Null,
        OwnedValue::Regex { pattern, options } => {
            json!({ "$regex": pattern, "$options": options })
        }
        OwnedValue::DbPointer { name, id } => {
            json!({ "$dbPointer": { "$ref": name, "$id": { "$oid": id.to_hex() } } })
        }
        OwnedValue::JavaScript(code) => json!({ "$code": code }),
        OwnedValue::Symbol(s) => json!({ "$symbol": s }),
        OwnedValue::JavaScriptWithScope { code, scope } => {
            json!({ "$code": code, "$scope": owned_fields_json(scope) })
        }
        OwnedValue::Int32(i) => json!(i),
        OwnedValue::Timestamp(ts) => {
            json!({ "$timestamp": { "t": ts.seconds, "i": ts.increment } })
        }
        OwnedValue::Int64(i) => json!(i),
        OwnedValue::Decimal128(d) => json!({ "$decimal128": hex_lower(d.bytes()) }),
        OwnedValue::MinKey => json!({ "$minKey": 1 }),
        OwnedValue::MaxKey => json!({ "$maxKey": 1 }),
    }
}
