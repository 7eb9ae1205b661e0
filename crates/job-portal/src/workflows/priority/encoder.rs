use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::workflows::candidates::domain::CandidateRecord;

/// Numeric inputs, in the order they lead every encoded vector.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "Age",
    "YearsCode",
    "YearsCodePro",
    "ComputerSkills",
    "Employed",
];

/// Categorical inputs, in the order their one-hot groups follow the numeric columns.
pub const CATEGORICAL_FIELDS: [&str; 4] = ["Gender", "EdLevel", "MentalHealth", "JobRole"];

/// Ordered feature-column names a model was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

/// Encoded candidate together with the columns its values line up with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub schema: FeatureSchema,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.schema
            .position(column)
            .map(|index| self.values[index])
    }
}

/// Feature vector aligned to a model schema, with an account of what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Values laid out in the model schema's column order.
    pub vector: FeatureVector,
    /// Schema columns the fresh vector lacked; their values are zero.
    pub filled: Vec<String>,
    /// Fresh columns the schema does not know about.
    pub dropped: Vec<String>,
}

impl Reconciliation {
    pub fn columns(&self) -> &[String] {
        self.vector.schema.columns()
    }

    pub fn is_exact(&self) -> bool {
        self.filled.is_empty() && self.dropped.is_empty()
    }
}

/// One-hot encoder whose category sets are the distinct labels seen while fitting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureEncoder {
    genders: BTreeSet<String>,
    ed_levels: BTreeSet<String>,
    mental_health: BTreeSet<String>,
    job_roles: BTreeSet<String>,
}

impl FeatureEncoder {
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CandidateRecord>,
    {
        let mut encoder = Self::default();
        for record in records {
            encoder.observe(record);
        }
        encoder
    }

    pub fn observe(&mut self, record: &CandidateRecord) {
        self.genders.insert(record.gender.label().to_string());
        self.ed_levels.insert(record.ed_level.label().to_string());
        self.mental_health
            .insert(record.mental_health.label().to_string());
        self.job_roles.insert(record.job_role.label().to_string());
    }

    fn groups(&self) -> [(&'static str, &BTreeSet<String>); 4] {
        [
            (CATEGORICAL_FIELDS[0], &self.genders),
            (CATEGORICAL_FIELDS[1], &self.ed_levels),
            (CATEGORICAL_FIELDS[2], &self.mental_health),
            (CATEGORICAL_FIELDS[3], &self.job_roles),
        ]
    }

    pub fn schema(&self) -> FeatureSchema {
        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
        for (field, labels) in self.groups() {
            columns.extend(labels.iter().map(|label| format!("{field}_{label}")));
        }
        FeatureSchema::new(columns)
    }

    /// Values in the order of [`FeatureEncoder::schema`].
    pub fn encode(&self, record: &CandidateRecord) -> Vec<f64> {
        let mut values = vec![
            f64::from(record.age),
            record.years_code,
            record.years_code_pro,
            f64::from(record.computer_skills),
            if record.employed { 1.0 } else { 0.0 },
        ];

        let labels = [
            record.gender.label(),
            record.ed_level.label(),
            record.mental_health.label(),
            record.job_role.label(),
        ];
        for ((_, known), label) in self.groups().into_iter().zip(labels) {
            values.extend(
                known
                    .iter()
                    .map(|candidate| if candidate == label { 1.0 } else { 0.0 }),
            );
        }

        values
    }

    pub fn encode_vector(&self, record: &CandidateRecord) -> FeatureVector {
        FeatureVector {
            schema: self.schema(),
            values: self.encode(record),
        }
    }

    pub fn encode_all<'a, I>(&self, records: I) -> Vec<Vec<f64>>
    where
        I: IntoIterator<Item = &'a CandidateRecord>,
    {
        records.into_iter().map(|record| self.encode(record)).collect()
    }
}

/// Encodes `candidate` using the categories of `historical` plus its own.
pub fn encode_candidate(
    candidate: &CandidateRecord,
    historical: &[CandidateRecord],
) -> FeatureVector {
    let encoder = FeatureEncoder::fit(historical.iter().chain(std::iter::once(candidate)));
    encoder.encode_vector(candidate)
}

/// Aligns a freshly encoded vector to `schema`, zero-filling and dropping columns as needed.
pub fn reconcile(vector: &FeatureVector, schema: &FeatureSchema) -> Reconciliation {
    let fresh: HashMap<&str, f64> = vector
        .schema
        .columns()
        .iter()
        .map(String::as_str)
        .zip(vector.values.iter().copied())
        .collect();

    let mut filled = Vec::new();
    let values = schema
        .columns()
        .iter()
        .map(|column| match fresh.get(column.as_str()) {
            Some(value) => *value,
            None => {
                filled.push(column.clone());
                0.0
            }
        })
        .collect();

    let known: HashSet<&str> = schema.columns().iter().map(String::as_str).collect();
    let dropped = vector
        .schema
        .columns()
        .iter()
        .filter(|column| !known.contains(column.as_str()))
        .cloned()
        .collect();

    Reconciliation {
        vector: FeatureVector {
            schema: schema.clone(),
            values,
        },
        filled,
        dropped,
    }
}

pub fn encode_for_schema(
    candidate: &CandidateRecord,
    historical: &[CandidateRecord],
    schema: &FeatureSchema,
) -> Reconciliation {
    reconcile(&encode_candidate(candidate, historical), schema)
}
