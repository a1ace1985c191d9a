use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::args::EndpointSpec;

/// Per-path field templates: `{"/users": {"name": "string", "age": "integer"}}`.
pub type PayloadTemplates = BTreeMap<String, BTreeMap<String, FieldKind>>;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Email,
    Integer,
    Float,
    Boolean,
}

/// Produces request bodies for endpoints whose method carries one.
pub trait PayloadGenerator: Send + Sync {
    /// Returns `None` for GET and DELETE.
    fn generate(&self, endpoint: &EndpointSpec) -> Option<Value>;
}

const FIELD_PROBABILITY: f64 = 0.7;
const STATUSES: [&str; 3] = ["active", "inactive", "pending"];
const CATEGORIES: [&str; 3] = ["category1", "category2", "category3"];

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

fn lock(rng: &Mutex<StdRng>) -> MutexGuard<'_, StdRng> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Formats a cent amount as a two-decimal JSON number.
fn price_value(cents: u64) -> Value {
    format!("{}.{:02}", cents / 100, cents % 100)
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Includes each candidate field independently with probability 0.7.
#[derive(Debug)]
pub struct RandomPayloadGenerator {
    rng: Mutex<StdRng>,
}

impl RandomPayloadGenerator {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    fn candidate_fields(rng: &mut StdRng) -> Vec<(&'static str, Value)> {
        let now = chrono::Utc::now();
        let timestamp = now.to_rfc3339();
        let tag_count: usize = rng.gen_range(1..=3);
        let tags: Vec<Value> = (0..tag_count)
            .map(|_| Value::String(format!("tag{}", rng.gen_range(1..=5))))
            .collect();

        vec![
            ("id", json!(rng.gen_range(1..=10_000u32))),
            (
                "name",
                json!(format!("Test Item {}", rng.gen_range(1..=1000u32))),
            ),
            (
                "description",
                json!(format!("Test description {}", rng.gen_range(1..=1000u32))),
            ),
            ("created_at", json!(timestamp)),
            ("updated_at", json!(timestamp)),
            (
                "status",
                json!(STATUSES.choose(rng).copied().unwrap_or("active")),
            ),
            ("value", json!(rng.gen_range(1..=1000u32))),
            ("price", price_value(rng.gen_range(1_000..=100_000u64))),
            (
                "email",
                json!(format!("test{}@example.com", rng.gen_range(1..=1000u32))),
            ),
            (
                "phone",
                json!(format!(
                    "+1-555-{}-{}",
                    rng.gen_range(100..=999u32),
                    rng.gen_range(1000..=9999u32)
                )),
            ),
            (
                "address",
                json!(format!(
                    "{} Test Street, Test City, TS {}",
                    rng.gen_range(1..=9999u32),
                    rng.gen_range(10_000..=99_999u32)
                )),
            ),
            (
                "category",
                json!(CATEGORIES.choose(rng).copied().unwrap_or("category1")),
            ),
            ("tags", Value::Array(tags)),
            (
                "metadata",
                json!({
                    "test_data": true,
                    "generated_at": now.timestamp(),
                    "random_id": rng.gen_range(1..=1_000_000u32),
                }),
            ),
        ]
    }
}

impl PayloadGenerator for RandomPayloadGenerator {
    fn generate(&self, endpoint: &EndpointSpec) -> Option<Value> {
        if !endpoint.method.carries_body() {
            return None;
        }
        let mut rng = lock(&self.rng);
        let fields = Self::candidate_fields(&mut rng);
        let body: Map<String, Value> = fields
            .into_iter()
            .filter(|_| rng.gen_bool(FIELD_PROBABILITY))
            .map(|(key, value)| (key.to_owned(), value))
            .collect();
        Some(Value::Object(body))
    }
}

/// Generates every templated field for paths with a template and falls back
/// to the random generator elsewhere.
#[derive(Debug)]
pub struct TemplatePayloadGenerator {
    templates: PayloadTemplates,
    rng: Mutex<StdRng>,
    fallback: RandomPayloadGenerator,
}

impl TemplatePayloadGenerator {
    #[must_use]
    pub fn new(templates: PayloadTemplates, seed: Option<u64>) -> Self {
        Self {
            templates,
            rng: Mutex::new(seeded_rng(seed)),
            fallback: RandomPayloadGenerator::new(seed.map(|value| value.wrapping_add(1))),
        }
    }

    fn field_value(rng: &mut StdRng, field: &str, kind: FieldKind) -> Value {
        match kind {
            FieldKind::String => json!(format!("Test {} {}", field, rng.gen_range(1..=1000u32))),
            FieldKind::Email => {
                json!(format!("test{}@example.com", rng.gen_range(1..=1000u32)))
            }
            FieldKind::Integer => json!(rng.gen_range(1..=1000u32)),
            FieldKind::Float => price_value(rng.gen_range(100..=100_000u64)),
            FieldKind::Boolean => json!(rng.gen_bool(0.5)),
        }
    }
}

impl PayloadGenerator for TemplatePayloadGenerator {
    fn generate(&self, endpoint: &EndpointSpec) -> Option<Value> {
        if !endpoint.method.carries_body() {
            return None;
        }
        let Some(template) = self.templates.get(&endpoint.path) else {
            return self.fallback.generate(endpoint);
        };
        let mut rng = lock(&self.rng);
        let body: Map<String, Value> = template
            .iter()
            .map(|(field, kind)| (field.clone(), Self::field_value(&mut rng, field, *kind)))
            .collect();
        Some(Value::Object(body))
    }
}

/// Picks the template generator when templates are configured.
#[must_use]
pub fn payload_generator(
    templates: &PayloadTemplates,
    seed: Option<u64>,
) -> Arc<dyn PayloadGenerator> {
    if templates.is_empty() {
        Arc::new(RandomPayloadGenerator::new(seed))
    } else {
        Arc::new(TemplatePayloadGenerator::new(templates.clone(), seed))
    }
}
