//! Name collision resolution.
//!
//! Unreal has no namespaces, so every schema and endpoint of every document
//! lands in one flat name space. This module derives service names from
//! document titles, picks the namespaced name of each component schema and
//! assigns each operation a global and a subsystem-local endpoint name. It also
//! records which fields are required, keyed by field handle.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use unreal_apigen_common::{GenerationMode, GeneratorConfig};

use crate::error::GenError;
use crate::openapi::spec::{HttpVerb, NamedSchema, OpenApiDocument};

use super::utils::{capitalize, sanitize};

/// Flavour of a backend service, read from the second word of the document title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Plain service.
    Basic,
    /// Actor-style service.
    Api,
    /// Per-object service (`/object/{service}/{objectId}/...`).
    Object,
}

impl ServiceKind {
    /// Prefix used when a name collides with another service's name.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Api => "Api",
            Self::Object => "Object",
        }
    }

    fn from_service_title(title: &str) -> Self {
        let lower = title.to_lowercase();
        if lower.contains("object") {
            Self::Object
        } else if lower.contains("actor") {
            Self::Api
        } else {
            Self::Basic
        }
    }
}

/// Names derived from a document title such as `"inventory basic"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNaming {
    /// `Capitalize(Sanitize(word0))`, for example `Inventory`.
    pub name: String,
    /// `Capitalize(Sanitize(word1))`, or `Basic` for single-word titles.
    pub title: String,
    /// Service flavour. Always `Basic` when generating service clients.
    pub kind: ServiceKind,
}

impl ServiceNaming {
    /// Split a document title into service name, service title and kind.
    pub fn from_title(document_title: &str, mode: GenerationMode) -> Self {
        let words: Vec<&str> = document_title.split(' ').collect();
        let name = capitalize(&sanitize(words.first().copied().unwrap_or_default()));
        let title = match words.get(1) {
            Some(word) => capitalize(&sanitize(word)),
            None => "Basic".to_string(),
        };
        let kind = match mode {
            GenerationMode::ServiceClient => ServiceKind::Basic,
            GenerationMode::ObjectModel => ServiceKind::from_service_title(&title),
        };
        Self { name, title, kind }
    }

    /// Name of the engine subsystem the service's endpoints are declared on.
    pub fn subsystem_name(&self, mode: GenerationMode) -> String {
        match mode {
            GenerationMode::ObjectModel => capitalize(&self.name),
            GenerationMode::ServiceClient => format!("{}Ms", capitalize(&self.name)),
        }
    }
}

/// `"{owner}.{field}"`
pub fn field_handle(owner: &str, field: &str) -> String {
    format!("{owner}.{field}")
}

/// Owner part of a parameter handle: `"{serviceName}_{globalEndpointName}"`.
pub fn parameter_owner(service_name: &str, global_endpoint_name: &str) -> String {
    format!("{service_name}_{global_endpoint_name}")
}

/// Endpoint name before collision handling.
///
/// `/object/mail/{objectId}/detail` with `Get` becomes `GetDetail`: the first
/// two segments are dropped, `{param}` segments removed, the rest split on `/`
/// and `-` and joined in upper camel case.
pub fn candidate_endpoint_name(service_name: &str, verb: HttpVerb, path: &str) -> String {
    let relevant = after_slash(path, 1);
    let relevant = after_slash(relevant, 0);

    let joined: String = strip_path_params(relevant)
        .split(['/', '-'])
        .map(capitalize)
        .collect();
    let joined = if joined.chars().count() > 1 {
        capitalize(&joined)
    } else {
        joined
    };

    let method = sanitize(&joined);
    let method = if method.is_empty() {
        service_name.to_string()
    } else {
        method
    };
    format!("{verb}{method}")
}

/// Substring after the first `/` found at or after `from`, or the whole string.
fn after_slash(path: &str, from: usize) -> &str {
    path.get(from..)
        .and_then(|rest| rest.find('/'))
        .map_or(path, |idx| &path[from + idx + 1..])
}

fn strip_path_params(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Names of the `{param}` segments of a route, in order.
pub fn path_param_names(path: &str) -> Vec<&str> {
    path.split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(name, _)| name))
        .collect()
}

/// Microservice endpoint name: the capitalized, sanitized route.
fn service_client_endpoint_name(service_name: &str, path: &str) -> String {
    let name = if path.chars().count() > 1 {
        capitalize(path)
    } else {
        path.to_string()
    };
    let name = sanitize(&name);
    if name.is_empty() {
        service_name.to_string()
    } else {
        name
    }
}

// ============================================================================
// Schemas
// ============================================================================

/// Picks namespaced names for component schemas.
#[derive(Debug)]
pub struct SchemaNamer<'a> {
    documents: &'a [OpenApiDocument],
    config: &'a GeneratorConfig,
    overlaps: HashMap<&'a str, Vec<NamedSchema<'a>>>,
}

impl<'a> SchemaNamer<'a> {
    /// Group every named schema by its raw identifier.
    pub fn new(
        documents: &'a [OpenApiDocument],
        schemas: &[NamedSchema<'a>],
        config: &'a GeneratorConfig,
    ) -> Self {
        let mut overlaps: HashMap<&'a str, Vec<NamedSchema<'a>>> = HashMap::new();
        for schema in schemas {
            overlaps.entry(schema.name).or_default().push(*schema);
        }
        Self {
            documents,
            config,
            overlaps,
        }
    }

    /// Whether schemas sharing `name` disagree on their field names.
    ///
    /// Only adjacent declarations are compared and only by sorted property
    /// names; field types are not looked at.
    fn collides(&self, name: &str) -> bool {
        let Some(group) = self.overlaps.get(name) else {
            return false;
        };
        group.len() > 1
            && group.windows(2).any(|pair| {
                let a: BTreeSet<&String> = pair[0].schema.properties.keys().collect();
                let b: BTreeSet<&String> = pair[1].schema.properties.keys().collect();
                a != b
            })
    }

    /// Namespaced name of the schema `name` declared in document `document`.
    pub fn schema_name(&self, document: usize, name: &str, optional: bool) -> String {
        let title = self
            .documents
            .get(document)
            .map(|doc| doc.info.title.as_str())
            .unwrap_or_default();

        let mut ns = if self.collides(name) {
            let service = ServiceNaming::from_title(title, self.config.mode);
            format!(
                "{}{}{name}",
                capitalize(&service.name),
                capitalize(&service.title)
            )
        } else {
            name.to_string()
        };

        if ns.ends_with("Request") {
            ns.push_str("Body");
        }
        if let Some(renamed) = self.config.type_overrides.get(&ns) {
            ns.clone_from(renamed);
        }
        if self.config.mode == GenerationMode::ServiceClient {
            ns = format!("{}{ns}", sanitize(title));
        }

        if optional {
            format!("Optional{ns}")
        } else {
            ns
        }
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Final names of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointNames {
    /// Unique across every document. Names the request type and its files.
    pub global: String,
    /// Unique within the owning subsystem. Names the subsystem functions.
    pub subsystem: String,
}

type EndpointKey = (usize, String, HttpVerb);

/// Global and subsystem names of every operation of every document.
#[derive(Debug, Default)]
pub struct EndpointNaming {
    names: BTreeMap<EndpointKey, EndpointNames>,
}

struct Candidate {
    key: EndpointKey,
    service: String,
    subsystem: String,
    kind: ServiceKind,
    path: String,
    name: String,
}

impl EndpointNaming {
    /// Resolve endpoint names for all documents.
    pub fn build(documents: &[OpenApiDocument], config: &GeneratorConfig) -> Result<Self, GenError> {
        let mut candidates = Vec::new();
        for (index, doc) in documents.iter().enumerate() {
            let service = ServiceNaming::from_title(&doc.info.title, config.mode);
            let subsystem = service.subsystem_name(config.mode);
            for (path, item) in &doc.paths {
                for (verb, _) in item.operations() {
                    let name = match config.mode {
                        GenerationMode::ObjectModel => {
                            candidate_endpoint_name(&service.name, verb, path)
                        }
                        GenerationMode::ServiceClient => {
                            service_client_endpoint_name(&subsystem, path)
                        }
                    };
                    candidates.push(Candidate {
                        key: (index, path.clone(), verb),
                        service: service.name.clone(),
                        subsystem: subsystem.clone(),
                        kind: service.kind,
                        path: path.clone(),
                        name,
                    });
                }
            }
        }

        let names = match config.mode {
            GenerationMode::ObjectModel => Self::object_model_names(&candidates, config)?,
            GenerationMode::ServiceClient => Self::service_client_names(&candidates)?,
        };
        Ok(Self { names })
    }

    fn object_model_names(
        candidates: &[Candidate],
        config: &GeneratorConfig,
    ) -> Result<BTreeMap<EndpointKey, EndpointNames>, GenError> {
        let mut global_counts: HashMap<&str, usize> = HashMap::new();
        let mut service_counts: HashMap<(&str, &str), usize> = HashMap::new();
        for c in candidates {
            *global_counts.entry(&c.name).or_default() += 1;
            *service_counts.entry((&c.service, &c.name)).or_default() += 1;
        }

        let mut resolved: Vec<EndpointNames> = candidates
            .iter()
            .map(|c| {
                let prefixed = format!("{}{}{}", c.kind.prefix(), c.subsystem, c.name);
                let global = if global_counts[c.name.as_str()] > 1 {
                    prefixed.clone()
                } else {
                    c.name.clone()
                };
                let subsystem = if service_counts[&(c.service.as_str(), c.name.as_str())] > 1 {
                    prefixed
                } else {
                    c.name.clone()
                };
                EndpointNames { global, subsystem }
            })
            .collect();

        // Routes that still share a name inside one service are told apart by their path parameters.
        let mut local_counts: HashMap<(&str, String), usize> = HashMap::new();
        for (c, names) in candidates.iter().zip(&resolved) {
            *local_counts
                .entry((&c.service, names.subsystem.clone()))
                .or_default() += 1;
        }
        for (c, names) in candidates.iter().zip(resolved.iter_mut()) {
            if local_counts[&(c.service.as_str(), names.subsystem.clone())] < 2 {
                continue;
            }
            let params = path_param_names(&c.path);
            if params.is_empty() {
                continue;
            }
            let suffix: Vec<String> = params.iter().map(|p| capitalize(&sanitize(p))).collect();
            let suffix = format!("By{}", suffix.join("And"));
            tracing::debug!(
                service = %c.service,
                endpoint = %names.subsystem,
                suffix = %suffix,
                "Disambiguated endpoint by path parameters."
            );
            names.global.push_str(&suffix);
            names.subsystem.push_str(&suffix);
        }

        for names in &mut resolved {
            for name in [&mut names.global, &mut names.subsystem] {
                if let Some(renamed) = config.endpoint_overrides.get(name.as_str()) {
                    name.clone_from(renamed);
                }
            }
        }

        let mut seen_local: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut seen_global: BTreeSet<&str> = BTreeSet::new();
        for (c, names) in candidates.iter().zip(&resolved) {
            if !seen_local.insert((&c.service, &names.subsystem)) {
                return Err(GenError::LocalEndpointCollision {
                    name: names.subsystem.clone(),
                    service: c.service.clone(),
                });
            }
            if !seen_global.insert(&names.global) {
                return Err(GenError::GlobalEndpointCollision {
                    name: names.global.clone(),
                    service: c.service.clone(),
                    route: c.path.clone(),
                });
            }
        }

        Ok(candidates
            .iter()
            .map(|c| c.key.clone())
            .zip(resolved)
            .collect())
    }

    fn service_client_names(
        candidates: &[Candidate],
    ) -> Result<BTreeMap<EndpointKey, EndpointNames>, GenError> {
        let mut seen_global: BTreeSet<String> = BTreeSet::new();
        let mut seen_local: BTreeSet<(&str, &str)> = BTreeSet::new();
        let mut names = BTreeMap::new();

        for c in candidates {
            let global = format!("{}{}", c.subsystem, c.name);
            if !seen_global.insert(global.clone()) {
                return Err(GenError::GlobalEndpointCollision {
                    name: global,
                    service: c.service.clone(),
                    route: c.path.clone(),
                });
            }
            if !seen_local.insert((&c.subsystem, &c.name)) {
                return Err(GenError::SubsystemEndpointCollision {
                    name: c.name.clone(),
                    subsystem: c.subsystem.clone(),
                    route: c.path.clone(),
                });
            }
            names.insert(
                c.key.clone(),
                EndpointNames {
                    global,
                    subsystem: c.name.clone(),
                },
            );
        }
        Ok(names)
    }

    /// Names of the operation `verb path` in document `document`.
    pub fn get(&self, document: usize, path: &str, verb: HttpVerb) -> Option<&EndpointNames> {
        self.names.get(&(document, path.to_string(), verb))
    }
}

// ============================================================================
// Required fields
// ============================================================================

/// Required flag per field handle. The first declaration of a handle wins.
#[derive(Debug, Default)]
pub struct RequiredFields {
    flags: BTreeMap<String, bool>,
}

impl RequiredFields {
    /// Record schema properties and operation parameters of every document.
    pub fn build(
        documents: &[OpenApiDocument],
        schemas: &[NamedSchema<'_>],
        namer: &SchemaNamer<'_>,
        endpoints: &EndpointNaming,
        mode: GenerationMode,
    ) -> Self {
        let mut flags = BTreeMap::new();

        for named in schemas {
            let owner = namer.schema_name(named.document, named.name, false);
            for field in named.schema.properties.keys() {
                let required = named.schema.required.contains(field);
                flags
                    .entry(field_handle(&owner, field))
                    .or_insert(required);
            }
        }

        for (index, doc) in documents.iter().enumerate() {
            let service = ServiceNaming::from_title(&doc.info.title, mode);
            for (path, item) in &doc.paths {
                for (verb, op) in item.operations() {
                    let Some(names) = endpoints.get(index, path, verb) else {
                        continue;
                    };
                    let owner = parameter_owner(&service.name, &names.global);
                    for param in &op.parameters {
                        flags
                            .entry(field_handle(&owner, &param.name))
                            .or_insert(param.is_required());
                    }
                }
            }
        }

        Self { flags }
    }

    /// A handle is optional only when it was recorded as not required.
    pub fn is_optional(&self, handle: &str) -> bool {
        self.flags.get(handle) == Some(&false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::spec::ordered_schemas;

    fn doc(title: &str, body: &str) -> OpenApiDocument {
        let json = format!(r#"{{ "info": {{ "title": "{title}" }}, {body} }}"#);
        OpenApiDocument::from_json(title, &json).unwrap()
    }

    #[test]
    fn test_service_naming() {
        let cases = [
            ("inventory basic", "Inventory", "Basic", ServiceKind::Basic),
            ("mail object", "Mail", "Object", ServiceKind::Object),
            ("stats actor", "Stats", "Actor", ServiceKind::Api),
            ("session", "Session", "Basic", ServiceKind::Basic),
            ("beam-content basic", "BeamContent", "Basic", ServiceKind::Basic),
        ];
        for (title, name, service_title, kind) in cases {
            let naming = ServiceNaming::from_title(title, GenerationMode::ObjectModel);
            assert_eq!(naming.name, name, "{title}");
            assert_eq!(naming.title, service_title, "{title}");
            assert_eq!(naming.kind, kind, "{title}");
        }

        let ms = ServiceNaming::from_title("mail object", GenerationMode::ServiceClient);
        assert_eq!(ms.kind, ServiceKind::Basic);
        assert_eq!(ms.subsystem_name(GenerationMode::ServiceClient), "MailMs");
    }

    #[test]
    fn test_candidate_endpoint_name() {
        let cases = [
            (HttpVerb::Get, "/object/mail/{objectId}/detail", "GetDetail"),
            (HttpVerb::Post, "/basic/inventory/items", "PostItems"),
            (HttpVerb::Put, "/basic/accounts/admin/email-update", "PutAdminEmailUpdate"),
            (HttpVerb::Delete, "/object/mail/{objectId}/", "DeleteMail"),
            (HttpVerb::Get, "/basic/mail/", "GetMail"),
            (HttpVerb::Post, "/basic/auth/token", "PostToken"),
        ];
        for (verb, path, expected) in cases {
            assert_eq!(candidate_endpoint_name("Mail", verb, path), expected, "{path}");
        }
    }

    #[test]
    fn test_path_param_names() {
        assert_eq!(
            path_param_names("/object/stats/{objectId}/{statKey}"),
            vec!["objectId", "statKey"]
        );
        assert!(path_param_names("/basic/mail/").is_empty());
    }

    #[test]
    fn test_schema_names() {
        let docs = vec![
            doc(
                "mail basic",
                r#""components": { "schemas": {
                    "Message": { "properties": { "id": {}, "body": {} } },
                    "SendRequest": { "properties": {} },
                    "Player": { "properties": {} }
                } }"#,
            ),
            doc(
                "chat object",
                r#""components": { "schemas": {
                    "Message": { "properties": { "id": {} } }
                } }"#,
            ),
        ];
        let schemas = ordered_schemas(&docs);
        let config = GeneratorConfig::default();
        let namer = SchemaNamer::new(&docs, &schemas, &config);

        assert_eq!(namer.schema_name(0, "Message", false), "MailBasicMessage");
        assert_eq!(namer.schema_name(1, "Message", true), "OptionalChatObjectMessage");
        assert_eq!(namer.schema_name(0, "SendRequest", false), "SendRequestBody");
        assert_eq!(namer.schema_name(0, "Player", false), "PlayerId");
    }

    #[test]
    fn test_same_shape_schemas_share_a_name() {
        let body = r#""components": { "schemas": { "Tag": { "properties": { "a": {}, "b": {} } } } }"#;
        let docs = vec![doc("mail basic", body), doc("chat basic", body)];
        let schemas = ordered_schemas(&docs);
        let config = GeneratorConfig::default();
        let namer = SchemaNamer::new(&docs, &schemas, &config);
        assert_eq!(namer.schema_name(1, "Tag", false), "Tag");
    }

    #[test]
    fn test_service_client_schema_prefix() {
        let docs = vec![doc("MyService", r#""components": { "schemas": { "Reply": {} } }"#)];
        let schemas = ordered_schemas(&docs);
        let config = GeneratorConfig {
            mode: GenerationMode::ServiceClient,
            ..GeneratorConfig::default()
        };
        let namer = SchemaNamer::new(&docs, &schemas, &config);
        assert_eq!(namer.schema_name(0, "Reply", false), "MyServiceReply");
    }

    #[test]
    fn test_global_collision_is_prefixed_and_overrides_apply() {
        let docs = vec![
            doc(
                "mail basic",
                r#""paths": { "/basic/mail/detail": { "get": {} }, "/basic/auth/token": { "post": {} } }"#,
            ),
            doc("stats object", r#""paths": { "/object/stats/{objectId}/detail": { "get": {} } }"#),
        ];
        let config = GeneratorConfig::default();
        let naming = EndpointNaming::build(&docs, &config).unwrap();

        let mail = naming.get(0, "/basic/mail/detail", HttpVerb::Get).unwrap();
        assert_eq!(mail.global, "BasicMailGetDetail");
        assert_eq!(mail.subsystem, "GetDetail");

        let stats = naming
            .get(1, "/object/stats/{objectId}/detail", HttpVerb::Get)
            .unwrap();
        assert_eq!(stats.global, "ObjectStatsGetDetail");

        let token = naming.get(0, "/basic/auth/token", HttpVerb::Post).unwrap();
        assert_eq!(token.global, "Authenticate");
        assert_eq!(token.subsystem, "Authenticate");
    }

    #[test]
    fn test_basic_and_object_documents_of_one_service() {
        let docs = vec![
            doc("party basic", r#""paths": { "/basic/party/invite": { "post": {} } }"#),
            doc(
                "party object",
                r#""paths": { "/object/party/{objectId}/invite": { "post": {} } }"#,
            ),
        ];
        let naming = EndpointNaming::build(&docs, &GeneratorConfig::default()).unwrap();
        let basic = naming.get(0, "/basic/party/invite", HttpVerb::Post).unwrap();
        let object = naming
            .get(1, "/object/party/{objectId}/invite", HttpVerb::Post)
            .unwrap();
        assert_eq!(basic.subsystem, "BasicPartyPostInvite");
        assert_eq!(object.subsystem, "ObjectPartyPostInvite");
    }

    #[test]
    fn test_local_collision_uses_path_params() {
        let docs = vec![doc(
            "mail basic",
            r#""paths": {
                "/basic/mail/{mailId}/detail": { "get": {} },
                "/basic/mail/detail": { "get": {} }
            }"#,
        )];
        let naming = EndpointNaming::build(&docs, &GeneratorConfig::default()).unwrap();
        let by_id = naming.get(0, "/basic/mail/{mailId}/detail", HttpVerb::Get).unwrap();
        let plain = naming.get(0, "/basic/mail/detail", HttpVerb::Get).unwrap();
        assert_eq!(by_id.subsystem, "BasicMailGetDetailByMailId");
        assert_eq!(plain.subsystem, "BasicMailGetDetail");
    }

    #[test]
    fn test_overrides_apply_after_path_param_suffix() {
        let docs = vec![doc(
            "mail basic",
            r#""paths": {
                "/basic/mail/{mailId}/detail": { "get": {} },
                "/basic/mail/detail": { "get": {} }
            }"#,
        )];
        let mut config = GeneratorConfig::default();
        config
            .endpoint_overrides
            .insert("BasicMailGetDetailByMailId".into(), "GetMailById".into());
        let naming = EndpointNaming::build(&docs, &config).unwrap();

        let by_id = naming.get(0, "/basic/mail/{mailId}/detail", HttpVerb::Get).unwrap();
        assert_eq!(by_id.global, "GetMailById");
        assert_eq!(by_id.subsystem, "GetMailById");
        let plain = naming.get(0, "/basic/mail/detail", HttpVerb::Get).unwrap();
        assert_eq!(plain.subsystem, "BasicMailGetDetail");
    }

    #[test]
    fn test_unresolvable_local_collision() {
        let docs = vec![doc(
            "mail basic",
            r#""paths": { "/basic/mail/a-b": { "get": {} }, "/basic/mail/a/b": { "get": {} } }"#,
        )];
        let err = EndpointNaming::build(&docs, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GenError::LocalEndpointCollision { ref service, .. } if service == "Mail"));
    }

    #[test]
    fn test_service_client_names_and_collisions() {
        let config = GeneratorConfig {
            mode: GenerationMode::ServiceClient,
            ..GeneratorConfig::default()
        };
        let docs = vec![doc("Shop", r#""paths": { "/buy-item": { "post": {} } }"#)];
        let naming = EndpointNaming::build(&docs, &config).unwrap();
        let names = naming.get(0, "/buy-item", HttpVerb::Post).unwrap();
        assert_eq!(names.global, "ShopMsBuyItem");
        assert_eq!(names.subsystem, "BuyItem");

        let docs = vec![doc(
            "Shop",
            r#""paths": { "/buy-item": { "post": {}, "get": {} } }"#,
        )];
        let err = EndpointNaming::build(&docs, &config).unwrap_err();
        assert!(matches!(err, GenError::GlobalEndpointCollision { ref name, .. } if name == "ShopMsBuyItem"));
    }

    #[test]
    fn test_required_fields() {
        let docs = vec![doc(
            "mail basic",
            r#""paths": { "/basic/mail/list": { "get": { "parameters": [
                { "name": "limit", "in": "query" },
                { "name": "mid", "in": "query", "required": true }
            ] } },
            "/basic/mail/{mailId}": { "get": { "parameters": [
                { "name": "mailId", "in": "path" }
            ] } } },
            "components": { "schemas": {
                "Mail": { "required": ["id"], "properties": { "id": {}, "note": {} } }
            } }"#,
        )];
        let config = GeneratorConfig::default();
        let schemas = ordered_schemas(&docs);
        let namer = SchemaNamer::new(&docs, &schemas, &config);
        let endpoints = EndpointNaming::build(&docs, &config).unwrap();
        let required = RequiredFields::build(&docs, &schemas, &namer, &endpoints, config.mode);

        assert!(!required.is_optional("Mail.id"));
        assert!(required.is_optional("Mail.note"));
        assert!(required.is_optional("Mail_GetList.limit"));
        assert!(!required.is_optional("Mail_GetList.mid"));
        assert!(!required.is_optional("Mail_GetMail.mailId"));
        assert!(!required.is_optional("Unknown.field"));
    }
}
