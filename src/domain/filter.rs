// Conjunctive filter predicates for repository queries
// Only AND of (field, op, value) triples; no OR, no grouping.

use super::errors::{DomainError, DomainResult};

/// Comparison operator supported by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
}

impl Comparison {
    /// SQL operator for this comparison
    pub fn sql(self) -> &'static str {
        match self {
            Comparison::Eq => " = ",
            Comparison::Gt => " > ",
            Comparison::Lt => " < ",
        }
    }
}

/// Storage kind of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
}

/// A literal compared against a field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Int(v) => Some(*v as f64),
            FilterValue::Float(v) => Some(*v),
            FilterValue::Text(_) => None,
        }
    }

    fn compare(&self, op: Comparison, record: &FilterValue) -> bool {
        match (record, self) {
            (FilterValue::Text(actual), FilterValue::Text(expected)) => {
                op == Comparison::Eq && actual == expected
            }
            (FilterValue::Int(actual), FilterValue::Int(expected)) => match op {
                Comparison::Eq => actual == expected,
                Comparison::Gt => actual > expected,
                Comparison::Lt => actual < expected,
            },
            _ => match (record.as_f64(), self.as_f64()) {
                (Some(actual), Some(expected)) => match op {
                    Comparison::Eq => actual == expected,
                    Comparison::Gt => actual > expected,
                    Comparison::Lt => actual < expected,
                },
                _ => false,
            },
        }
    }
}

/// A column that predicates may target
pub trait FilterField: Copy + std::fmt::Debug + Send + Sync {
    /// Column name in the relational schema
    fn column(self) -> &'static str;

    /// Storage kind used to validate operators and parse literals
    fn kind(self) -> FieldKind;

    /// Resolves a query-parameter name to a field
    fn from_name(name: &str) -> Option<Self>;
}

/// Records that can be matched in memory against a filter
pub trait Filterable<F: FilterField> {
    fn field_value(&self, field: F) -> FilterValue;
}

/// One `field op value` term
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<F> {
    pub field: F,
    pub op: Comparison,
    pub value: FilterValue,
}

/// AND-conjunction of predicates; empty matches everything
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    predicates: Vec<Predicate<F>>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<F: FilterField> Filter<F> {
    /// Empty filter
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a predicate, rejecting ordering operators on text fields and
    /// literals whose kind does not fit the field
    pub fn and(mut self, field: F, op: Comparison, value: FilterValue) -> DomainResult<Self> {
        let value = match (field.kind(), value) {
            (FieldKind::Text, FilterValue::Text(text)) => {
                if op != Comparison::Eq {
                    return Err(DomainError::validation(format!(
                        "field {} only supports equality",
                        field.column()
                    )));
                }
                FilterValue::Text(text)
            }
            (FieldKind::Integer, FilterValue::Int(v)) => FilterValue::Int(v),
            (FieldKind::Float, FilterValue::Int(v)) => FilterValue::Float(v as f64),
            (FieldKind::Float, FilterValue::Float(v)) if v.is_finite() => FilterValue::Float(v),
            (_, other) => {
                return Err(DomainError::validation(format!(
                    "invalid value {:?} for field {}",
                    other,
                    field.column()
                )))
            }
        };

        self.predicates.push(Predicate { field, op, value });
        Ok(self)
    }

    /// Parses a query-string style pair: `field`, `field_gt` or `field_lt`
    pub fn and_param(self, key: &str, raw: &str) -> DomainResult<Self> {
        let (name, op) = if let Some(name) = key.strip_suffix("_gt") {
            (name, Comparison::Gt)
        } else if let Some(name) = key.strip_suffix("_lt") {
            (name, Comparison::Lt)
        } else {
            (key, Comparison::Eq)
        };

        let field = F::from_name(name)
            .ok_or_else(|| DomainError::validation(format!("unknown filter: {}", key)))?;

        let value = match field.kind() {
            FieldKind::Text => FilterValue::Text(raw.to_string()),
            FieldKind::Integer => FilterValue::Int(raw.parse().map_err(|_| {
                DomainError::validation(format!("{} expects an integer, got {:?}", key, raw))
            })?),
            FieldKind::Float => FilterValue::Float(raw.parse().map_err(|_| {
                DomainError::validation(format!("{} expects a number, got {:?}", key, raw))
            })?),
        };

        self.and(field, op, value)
    }

    /// Builds a filter from query parameters
    pub fn from_params<'a>(
        params: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> DomainResult<Self> {
        params
            .into_iter()
            .try_fold(Self::all(), |filter, (key, value)| filter.and_param(key, value))
    }

    pub fn predicates(&self) -> &[Predicate<F>] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluates the conjunction against an in-memory record
    pub fn matches<R: Filterable<F>>(&self, record: &R) -> bool {
        self.predicates
            .iter()
            .all(|p| p.value.compare(p.op, &record.field_value(p.field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Field {
        Runs,
        Overs,
        Name,
    }

    impl FilterField for Field {
        fn column(self) -> &'static str {
            match self {
                Field::Runs => "runs",
                Field::Overs => "overs",
                Field::Name => "name",
            }
        }

        fn kind(self) -> FieldKind {
            match self {
                Field::Runs => FieldKind::Integer,
                Field::Overs => FieldKind::Float,
                Field::Name => FieldKind::Text,
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "runs" => Some(Field::Runs),
                "overs" => Some(Field::Overs),
                "name" => Some(Field::Name),
                _ => None,
            }
        }
    }

    struct Row {
        runs: i64,
        overs: f64,
        name: &'static str,
    }

    impl Filterable<Field> for Row {
        fn field_value(&self, field: Field) -> FilterValue {
            match field {
                Field::Runs => FilterValue::Int(self.runs),
                Field::Overs => FilterValue::Float(self.overs),
                Field::Name => FilterValue::Text(self.name.to_string()),
            }
        }
    }

    fn row() -> Row {
        Row {
            runs: 300,
            overs: 12.5,
            name: "Kasun",
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::<Field>::all().matches(&row()));
    }

    #[test]
    fn predicates_combine_with_and() {
        let filter = Filter::all()
            .and(Field::Runs, Comparison::Gt, FilterValue::Int(200))
            .unwrap()
            .and(Field::Overs, Comparison::Lt, FilterValue::Float(10.0))
            .unwrap();

        assert!(!filter.matches(&row()));
    }

    #[test]
    fn integer_literal_coerces_for_float_field() {
        let filter = Filter::all()
            .and(Field::Overs, Comparison::Gt, FilterValue::Int(12))
            .unwrap();

        assert!(filter.matches(&row()));
        assert_eq!(filter.predicates()[0].value, FilterValue::Float(12.0));
    }

    #[test]
    fn text_fields_reject_ordering() {
        let result = Filter::all().and(
            Field::Name,
            Comparison::Gt,
            FilterValue::Text("A".to_string()),
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn param_suffixes_select_operator() {
        let filter = Filter::<Field>::all()
            .and_param("runs_lt", "400")
            .unwrap()
            .and_param("name", "Kasun")
            .unwrap();

        assert_eq!(filter.predicates()[0].op, Comparison::Lt);
        assert_eq!(filter.predicates()[1].op, Comparison::Eq);
        assert!(filter.matches(&row()));
    }

    #[test]
    fn unknown_param_is_rejected() {
        let result = Filter::<Field>::all().and_param("strike_rate_gt", "100");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let result = Filter::<Field>::all().and_param("runs_gt", "lots");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
