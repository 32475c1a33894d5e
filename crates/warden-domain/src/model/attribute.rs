//! Attribute - Per-field validation and authorization contract
//!
//! An Attribute is immutable metadata once registered: a name, a kind that
//! supplies a type check and a type default, flags (required / unique /
//! fillable), an optional validity predicate, an optional default supplier,
//! the fill/show permission keys and the error-kind → code table.
//!
//! Codes and permission keys are derived from the owning entity type when
//! the attribute is registered, unless they were set explicitly.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use shared::{attribute_permission, AttributeAccess};

use super::entity::{Entity, Value, ID_ATTRIBUTE};
use super::error::{ErrorKind, ErrorRecord};

/// Validity predicate: pure, no side effects
pub type Predicate = Arc<dyn Fn(&Entity, &Value) -> bool + Send + Sync>;

/// Default-value supplier
pub type DefaultSupplier = Arc<dyn Fn(&Entity) -> Value + Send + Sync>;

/// Value shape an attribute accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Any,
    Text,
    Email,
    Integer,
    Boolean,
    Array,
    Object,
    Uuid,
    DateTime,
}

impl AttributeKind {
    /// Type-level check applied before any custom predicate
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeKind::Any => true,
            AttributeKind::Text => value.is_string(),
            AttributeKind::Email => value.as_str().is_some_and(is_email),
            AttributeKind::Integer => value.is_i64() || value.is_u64(),
            AttributeKind::Boolean => value.is_boolean(),
            AttributeKind::Array => value.is_array(),
            AttributeKind::Object => value.is_object(),
            AttributeKind::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            AttributeKind::DateTime => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        }
    }

    /// Default used when no supplier is injected
    pub fn type_default(&self) -> Value {
        match self {
            AttributeKind::Array => Value::Array(Vec::new()),
            AttributeKind::Object => Value::Object(serde_json::Map::new()),
            AttributeKind::Boolean => Value::Bool(false),
            AttributeKind::Uuid => Value::String(uuid::Uuid::new_v4().to_string()),
            AttributeKind::DateTime => Value::String(chrono::Utc::now().to_rfc3339()),
            _ => Value::Null,
        }
    }
}

fn is_email(s: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

/// One field of an entity type
#[derive(Clone)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
    required: bool,
    unique: bool,
    fillable: bool,
    predicate: Option<Predicate>,
    default: Option<DefaultSupplier>,
    permission_fill: Option<String>,
    permission_show: Option<String>,
    codes: BTreeMap<ErrorKind, String>,
    templates: BTreeMap<ErrorKind, String>,
    comment: Option<String>,
}

impl Attribute {
    /// Optional, fillable attribute with no extra constraint
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            unique: false,
            fillable: true,
            predicate: None,
            default: None,
            permission_fill: None,
            permission_show: None,
            codes: BTreeMap::new(),
            templates: BTreeMap::new(),
            comment: None,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Any)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Text)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Email)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Boolean)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Array)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Object)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::DateTime)
    }

    /// Generated v4 identifier; not fillable from input
    pub fn uuid(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Uuid).not_fillable()
    }

    /// The repository-assigned identity
    pub fn id() -> Self {
        Self::new(ID_ATTRIBUTE, AttributeKind::Integer).not_fillable()
    }

    // ========== Builders ==========

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_fillable(mut self) -> Self {
        self.fillable = false;
        self
    }

    pub fn fillable(mut self, fillable: bool) -> Self {
        self.fillable = fillable;
        self
    }

    /// Add a validity predicate, AND-ed with the kind's type check
    pub fn validate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Entity, &Value) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Predicate: string length (in characters) within `min..=max`
    pub fn length(self, min: usize, max: usize) -> Self {
        self.validate(move |_, value| {
            value
                .as_str()
                .map(|s| s.chars().count())
                .is_some_and(|len| len >= min && len <= max)
        })
    }

    /// Inject a default-value supplier
    pub fn default_with<F>(mut self, supplier: F) -> Self
    where
        F: Fn(&Entity) -> Value + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(supplier));
        self
    }

    /// Override the fill/show permission keys
    pub fn with_permissions(mut self, fill: impl Into<String>, show: impl Into<String>) -> Self {
        self.permission_fill = Some(fill.into());
        self.permission_show = Some(show.into());
        self
    }

    /// Override the code for one error kind
    pub fn with_code(mut self, kind: ErrorKind, code: impl Into<String>) -> Self {
        self.codes.insert(kind, code.into());
        self
    }

    /// Override the message template for one error kind
    pub fn with_message(mut self, kind: ErrorKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    pub fn describe(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Fill in codes and permission keys from the owning entity type.
    /// Explicit overrides are kept.
    pub(crate) fn bind(&mut self, entity_type: &str) {
        let prefix = format!(
            "{}_{}",
            entity_type.to_uppercase(),
            self.name.to_uppercase()
        );
        for kind in self.raisable_kinds() {
            self.codes
                .entry(kind)
                .or_insert_with(|| format!("{}_{}", prefix, kind.as_str()));
        }
        if self.permission_fill.is_none() {
            self.permission_fill = Some(attribute_permission(entity_type, &self.name, AttributeAccess::Fill));
        }
        if self.permission_show.is_none() {
            self.permission_show = Some(attribute_permission(entity_type, &self.name, AttributeAccess::Show));
        }
    }

    /// Kinds the validator and authorizer can raise for this field
    pub fn raisable_kinds(&self) -> Vec<ErrorKind> {
        let mut kinds = vec![ErrorKind::NotDefined, ErrorKind::NotValid, ErrorKind::NotAuthorized];
        if self.unique {
            kinds.push(ErrorKind::NotUnique);
        }
        kinds
    }

    // ========== Getters ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_fillable(&self) -> bool {
        self.fillable
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn permission_fill(&self) -> &str {
        self.permission_fill.as_deref().unwrap_or_default()
    }

    pub fn permission_show(&self) -> &str {
        self.permission_show.as_deref().unwrap_or_default()
    }

    pub fn code(&self, kind: ErrorKind) -> Option<&str> {
        self.codes.get(&kind).map(String::as_str)
    }

    pub fn codes(&self) -> &BTreeMap<ErrorKind, String> {
        &self.codes
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    // ========== Behaviour ==========

    /// Is a value valid for this attribute?
    pub fn valid(&self, entity: &Entity, value: &Value) -> bool {
        self.kind.accepts(value) && self.predicate.as_ref().map_or(true, |p| p(entity, value))
    }

    /// Default value: the injected supplier, else the kind's default
    pub fn get_default(&self, entity: &Entity) -> Value {
        match &self.default {
            Some(supplier) => supplier(entity),
            None => self.kind.type_default(),
        }
    }

    /// Build the error record for `kind` about `value`
    pub fn error(&self, kind: ErrorKind, value: Value) -> ErrorRecord {
        let code = self
            .code(kind)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_{}", self.name.to_uppercase(), kind.as_str()));
        let template = self
            .templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template());
        ErrorRecord::from_template(kind, code, self.name.clone(), template, value)
    }
}

impl core::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("unique", &self.unique)
            .field("fillable", &self.fillable)
            .field("has_predicate", &self.predicate.is_some())
            .field("has_default", &self.default.is_some())
            .field("permission_fill", &self.permission_fill)
            .field("permission_show", &self.permission_show)
            .field("codes", &self.codes)
            .finish()
    }
}
