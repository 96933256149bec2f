//! Mock Ollama responders shared by the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::{Request, Respond, ResponseTemplate};

/// Answers `/api/embed` with one vector per input.
///
/// Each vector is `[input length, 1.0, 0.5]`, so vectors differ between
/// inputs but always share a dimension.
pub struct EchoEmbeddings;

impl Respond for EchoEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let embeddings: Vec<Value> = match &body["input"] {
            Value::Array(inputs) => inputs
                .iter()
                .map(|input| {
                    let len = input.as_str().map(str::len).unwrap_or(0) as f64;
                    json!([len, 1.0, 0.5])
                })
                .collect(),
            Value::String(input) => vec![json!([input.len() as f64, 1.0, 0.5])],
            _ => return ResponseTemplate::new(400),
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "model": body["model"],
            "embeddings": embeddings,
        }))
    }
}

/// A search response with the given `(id, score, movie_name)` hits.
pub fn search_response(hits: &[(&str, f64, &str)]) -> Value {
    let hits: Vec<Value> = hits
        .iter()
        .map(|(id, score, name)| {
            json!({
                "_index": "movies",
                "_id": id,
                "_score": score,
                "_source": {
                    "text": format!("Movie[movie_id={}, movie_name={}]", id, name),
                    "vector": [0.1, 0.2, 0.3],
                    "metadata": {"movie_name": name}
                }
            })
        })
        .collect();
    json!({
        "took": 3,
        "timed_out": false,
        "hits": {"total": {"value": hits.len(), "relation": "eq"}, "hits": hits}
    })
}
