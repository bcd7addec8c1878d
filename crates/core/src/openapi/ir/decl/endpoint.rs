//! Request declarations: one `U{Endpoint}Request` per operation.
//!
//! Besides the request shape this module produces the C++ bodies of
//! `BuildRoute`, `BuildBody` and the Blueprint `Make` helper. Query strings are
//! assembled at runtime: the generated code carries its own
//! `bIsFirstQueryParam` flag because optional parameters may be absent.

use std::collections::{BTreeMap, BTreeSet};

use unreal_apigen_common::{GenerationMode, GeneratorConfig};

use crate::error::GenError;
use crate::openapi::ir::collisions::{field_handle, parameter_owner, EndpointNames, ServiceKind, ServiceNaming};
use crate::openapi::ir::emit::{render, ReplacementTable, Replacements};
use crate::openapi::ir::resolve::{ResolveFlags, Resolver, SemanticFields};
use crate::openapi::ir::templates::BUILD_BODY;
use crate::openapi::ir::types::{Primitive, UnrealType};
use crate::openapi::ir::wrappers::WrapperSynthesizer;
use crate::openapi::spec::{HttpVerb, Operation, Parameter, ParameterLocation, Schema};

use super::property::PropertyDeclaration;
use super::serializable::{ResponseBody, SerializableDeclaration};

const JSON_CONTENT: &str = "application/json";
const TEXT_CONTENT: &str = "text/plain";

/// A generated request UObject and everything the subsystem needs to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDeclaration {
    /// Name unique across every service.
    pub global_name: String,
    /// Name unique inside the owning subsystem.
    pub subsystem_name: String,
    /// Subsystem that declares the endpoint.
    pub owner: String,
    /// Service name, used for Blueprint categories.
    pub service_name: String,
    /// HTTP verb.
    pub verb: HttpVerb,
    /// Path template as written in the document.
    pub path: String,
    /// Route the request is sent to.
    pub route: String,
    /// Requires an authenticated user.
    pub is_auth: bool,
    /// Path parameters in document order.
    pub path_params: Vec<PropertyDeclaration>,
    /// Query parameters in document order.
    pub query_params: Vec<PropertyDeclaration>,
    /// JSON request body.
    pub body: Option<PropertyDeclaration>,
    /// Response type handed to the success delegate.
    pub response: UnrealType,
    /// Include statements for parameter and response types.
    pub request_includes: Vec<String>,
    /// Include statement of the response type.
    pub response_include: String,
    /// Body of `BuildRoute`.
    pub route_impl: String,
}

impl EndpointDeclaration {
    fn non_body_params(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.path_params.iter().chain(&self.query_params)
    }

    /// Name of a body field as a `Make` parameter: `_{Name}`, or
    /// `Body_{Name}` when a path or query parameter already took it.
    fn body_param_name(&self, field: &PropertyDeclaration) -> String {
        let candidate = format!("_{}", field.name);
        if self.non_body_params().any(|p| format!("_{}", p.name) == candidate) {
            format!("Body_{}", field.name)
        } else {
            candidate
        }
    }

    /// Tokens of the request templates.
    ///
    /// `body_fields` are the properties of the body type when it is a
    /// serializable of this run; `Make` then takes them one by one instead of
    /// the whole body object.
    pub fn request_replacements(
        &self,
        config: &GeneratorConfig,
        body_fields: Option<&[PropertyDeclaration]>,
    ) -> Result<Replacements, GenError> {
        let declarations = |params: &[PropertyDeclaration]| -> Result<String, GenError> {
            Ok(params
                .iter()
                .map(|p| p.declaration(config))
                .collect::<Result<Vec<_>, _>>()?
                .join("\n\t"))
        };

        let mut table = self.replacements(config);
        table.insert("RequestPathParameters", declarations(&self.path_params)?);
        table.insert("RequestQueryParameters", declarations(&self.query_params)?);
        table.insert("RequestBodyParameters", declarations(self.body.as_slice())?);
        table.insert(
            "_buildBodyImpl",
            match self.body {
                Some(_) => render(&BUILD_BODY, &table)?,
                None => String::new(),
            },
        );

        let body_fields = self
            .body
            .as_ref()
            .filter(|body| body.ty.is_uobject())
            .and(body_fields);
        table.insert("_makeParameterDeclaration", self.make_parameter_declaration(body_fields));
        table.insert("_makeHiddenParameterNames", self.make_hidden_parameter_names(body_fields));
        table.insert("_makeNonBodyImpl", self.make_non_body_impl());
        table.insert("_makeBodyImpl", self.make_body_impl(body_fields));
        Ok(table)
    }

    fn make_parameter_declaration(&self, body_fields: Option<&[PropertyDeclaration]>) -> String {
        let mut out = join_with_trailer(
            self.non_body_params().map(|p| format!("{} _{}", p.ty, p.name)),
            ", ",
        );
        let body = match (&self.body, body_fields) {
            (Some(_), Some(fields)) => fields
                .iter()
                .map(|f| format!("{} {}", f.ty, self.body_param_name(f)))
                .collect(),
            (Some(body), None) => vec![format!("{} {}", body.ty, self.body_param_name(body))],
            (None, _) => Vec::new(),
        };
        out.push_str(&join_with_trailer(body, ", "));
        out
    }

    fn make_hidden_parameter_names(&self, body_fields: Option<&[PropertyDeclaration]>) -> String {
        let mut out = join_with_trailer(
            self.non_body_params()
                .filter(|p| p.ty.is_optional())
                .map(|p| format!("_{}", p.name)),
            ",",
        );
        let body = match (&self.body, body_fields) {
            (Some(_), Some(fields)) => fields
                .iter()
                .filter(|f| f.ty.is_optional())
                .map(|f| self.body_param_name(f))
                .collect(),
            (Some(body), None) => vec![self.body_param_name(body)],
            (None, _) => Vec::new(),
        };
        out.push_str(&join_with_trailer(body, ","));
        out
    }

    fn make_non_body_impl(&self) -> String {
        join_with_trailer(
            self.non_body_params()
                .map(|p| format!("Req->{} = _{};", p.name, p.name)),
            "\n\t",
        )
    }

    fn make_body_impl(&self, body_fields: Option<&[PropertyDeclaration]>) -> String {
        let Some(body) = &self.body else {
            return String::new();
        };
        let b = &body.name;
        let Some(fields) = body_fields else {
            let param = self.body_param_name(body);
            return if body.ty.is_uobject() {
                format!("Req->{b} = {param};\n\tReq->{b}->Rename(nullptr, Req);\n\t")
            } else {
                format!("Req->{b} = {param};\n\t")
            };
        };

        let assignments: Vec<_> = fields
            .iter()
            .map(|field| {
                let (p, param) = (&field.name, self.body_param_name(field));
                if field.ty.is_uobject() {
                    format!(
                        "// Assumes the object is constructed and have the new request take ownership of the memory for it\n\tReq->{b}->{p} = {param};\n\tReq->{b}->{p}->Rename(nullptr, Req);"
                    )
                } else {
                    format!("Req->{b}->{p} = {param};")
                }
            })
            .collect();
        format!(
            "Req->{b} = NewObject<{}>(Req);\n\t{}\n\t",
            body.ty.pointerless(),
            assignments.join("\n\t")
        )
    }
}

fn join_with_trailer(items: impl IntoIterator<Item = String>, separator: &str) -> String {
    let items: Vec<_> = items.into_iter().collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("{}{separator}", items.join(separator))
    }
}

impl ReplacementTable for EndpointDeclaration {
    fn replacements(&self, config: &GeneratorConfig) -> Replacements {
        Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("blueprintExportMacro", config.blueprint_export_macro.clone()),
            ("includeStatementPrefix", config.header_path.clone()),
            ("blueprintIncludeStatementPrefix", config.blueprint_header_path.clone()),
            ("GlobalNamespacedEndpointName", self.global_name.clone()),
            ("SubsystemNamespacedEndpointName", self.subsystem_name.clone()),
            ("NamespacedOwnerServiceName", self.owner.clone()),
            ("ServiceName", self.service_name.clone()),
            ("EndpointName", self.path.clone()),
            ("EndpointVerb", self.verb.as_str().to_string()),
            ("_capitalizedEndpointVerb", self.verb.as_upper().to_string()),
            ("ResponseBodyUnrealType", self.response.to_string()),
            ("ResponseBodyNonPtrUnrealType", self.response.pointerless()),
            ("ResponseTypeIncludeStatement", self.response_include.clone()),
            ("RequestTypeIncludeStatements", self.request_includes.join("\n")),
            ("_buildRouteImpl", self.route_impl.clone()),
        ])
    }
}

// ============================================================================
// Route building
// ============================================================================

/// Text that substitutes one path parameter into `Route`.
fn path_substitution(param: &PropertyDeclaration, endpoint: &str) -> Result<String, GenError> {
    let p = &param.name;
    let value = match &param.ty {
        UnrealType::Primitive(Primitive::String) => format!("*{p}"),
        UnrealType::Primitive(Primitive::Int64) => format!("*FString::Printf(TEXT(\"%lld\"), {p})"),
        UnrealType::Primitive(Primitive::Int8 | Primitive::Int16 | Primitive::Int32) => {
            format!("*FString::FromInt({p})")
        }
        UnrealType::Primitive(Primitive::Guid) => format!("*{p}.ToString(EGuidFormats::DigitsWithHyphensLower)"),
        UnrealType::Enum(_) => format!("*UBeamJsonUtils::EnumToSerializationName({p})"),
        UnrealType::Semantic(_) => format!("*static_cast<FString>({p})"),
        other => {
            return Err(GenError::UnsupportedPathParam {
                parameter: param.raw_field_name.clone(),
                endpoint: endpoint.to_string(),
                unreal_type: other.to_string(),
            });
        }
    };
    Ok(format!(
        "Route = Route.Replace(TEXT(\"{{{}}}\"), {value});",
        param.raw_field_name
    ))
}

/// Text that appends one query parameter, or `None` for the legacy map and
/// array parameters the request cannot encode.
fn query_append(param: &PropertyDeclaration, endpoint: &str) -> Result<Option<String>, GenError> {
    let optional = param.ty.is_optional();
    let v = if optional {
        format!("{}.Val", param.name)
    } else {
        param.name.clone()
    };
    let value = match &param.non_optional {
        UnrealType::Primitive(Primitive::String) => format!("*{v}"),
        UnrealType::Primitive(Primitive::Int64) => format!("*FString::Printf(TEXT(\"%lld\"), {v})"),
        UnrealType::Primitive(Primitive::Int8 | Primitive::Int16 | Primitive::Int32) => {
            format!("*FString::FromInt({v})")
        }
        UnrealType::Primitive(Primitive::Bool) => format!("{v} ? TEXT(\"true\") : TEXT(\"false\")"),
        UnrealType::Primitive(Primitive::DateTime) => format!("*{v}.ToIso8601()"),
        UnrealType::Enum(_) => format!("*UBeamJsonUtils::EnumToSerializationName({v})"),
        UnrealType::Semantic(_) => format!("*static_cast<FString>({v})"),
        UnrealType::Array(_) | UnrealType::Map(_) | UnrealType::ArrayWrapper(_) | UnrealType::MapWrapper(_) => {
            tracing::warn!(
                endpoint,
                parameter = %param.raw_field_name,
                "Container query parameters are not encoded, leaving it out of the route."
            );
            return Ok(None);
        }
        other => {
            return Err(GenError::UnsupportedQueryParam {
                parameter: param.raw_field_name.clone(),
                endpoint: endpoint.to_string(),
                unreal_type: other.to_string(),
            });
        }
    };

    let indent = if optional { "\t" } else { "" };
    let mut out = String::new();
    if optional {
        out.push_str(&format!("if({}.IsSet){{\n\t\t", param.name));
    }
    out.push_str("bIsFirstQueryParam ? QueryParams.Append(TEXT(\"?\")) : QueryParams.Append(TEXT(\"&\"));\n\t");
    out.push_str(&format!(
        "{indent}QueryParams.Appendf(TEXT(\"%s=%s\"), TEXT(\"{}\"), {value});\n\t",
        param.raw_field_name
    ));
    out.push_str(&format!("{indent}bIsFirstQueryParam = false;\n\t"));
    if optional {
        out.push_str("}\n");
    }
    Ok(Some(out))
}

/// Body of `BuildRoute`.
pub fn build_route_impl(
    route: &str,
    path_params: &[PropertyDeclaration],
    query_params: &[PropertyDeclaration],
    endpoint: &str,
) -> Result<String, GenError> {
    let substitutions = path_params
        .iter()
        .map(|p| path_substitution(p, endpoint))
        .collect::<Result<Vec<_>, _>>()?;
    let mut appends = Vec::with_capacity(query_params.len());
    for param in query_params {
        if let Some(append) = query_append(param, endpoint)? {
            appends.push(append);
        }
    }

    Ok(format!(
        "FString Route = TEXT(\"{route}\");\n\t{}\n\t\n\tFString QueryParams = TEXT(\"\");\n\tQueryParams.Reserve(1024);\n\tbool bIsFirstQueryParam = true;\n\t{}\n\tRouteString.Appendf(TEXT(\"%s%s\"), *Route, *QueryParams);",
        substitutions.join("\n\t"),
        appends.join("\n\t")
    ))
}

// ============================================================================
// Building from operations
// ============================================================================

/// Response types discovered while building endpoints.
#[derive(Debug, Default)]
pub struct ResponseRegistry {
    /// Response role per serializable namespaced name.
    pub bodies: BTreeMap<String, ResponseBody>,
    /// `U{Endpoint}Response` wrappers for non-object responses.
    pub wrappers: Vec<SerializableDeclaration>,
    declared: BTreeSet<String>,
}

impl ResponseRegistry {
    fn register_json(&mut self, ns: String) {
        self.bodies.entry(ns).or_insert(ResponseBody::Json);
    }

    fn register_wrapper(&mut self, wrapper: SerializableDeclaration) {
        let ns = wrapper.namespaced();
        if self.declared.insert(ns.clone()) {
            self.bodies.insert(ns, ResponseBody::PrimitiveWrapper);
            self.wrappers.push(wrapper);
        }
    }
}

/// Where an operation was declared.
#[derive(Debug, Clone, Copy)]
pub struct OperationSite<'a> {
    /// Document index.
    pub document: usize,
    /// Path template.
    pub path: &'a str,
    /// HTTP verb.
    pub verb: HttpVerb,
    /// The operation itself.
    pub operation: &'a Operation,
    /// Final names of the operation.
    pub names: &'a EndpointNames,
}

/// Builds endpoint declarations against the shared resolution state.
#[derive(Debug, Clone, Copy)]
pub struct EndpointBuilder<'r, 'a> {
    resolver: &'r Resolver<'a>,
    semantic: &'r SemanticFields,
}

impl<'r, 'a> EndpointBuilder<'r, 'a> {
    /// Builder over `resolver` and the semantic field map.
    pub const fn new(resolver: &'r Resolver<'a>, semantic: &'r SemanticFields) -> Self {
        Self { resolver, semantic }
    }

    /// Declare the operation at `site`, registering helper types with `synth`
    /// and response types with `responses`.
    pub fn build(
        &self,
        site: OperationSite<'_>,
        synth: &mut WrapperSynthesizer,
        responses: &mut ResponseRegistry,
    ) -> Result<EndpointDeclaration, GenError> {
        let config = self.resolver.config();
        let doc = self.resolver.document(site.document);
        let service = ServiceNaming::from_title(&doc.info.title, config.mode);
        let global = &site.names.global;
        let owner = parameter_owner(&service.name, global);

        let mut path_params = Vec::new();
        let mut query_params = Vec::new();
        for param in &site.operation.parameters {
            let target = match param.location {
                ParameterLocation::Path => &mut path_params,
                ParameterLocation::Query => &mut query_params,
                ParameterLocation::Header | ParameterLocation::Cookie => {
                    tracing::warn!(
                        endpoint = %global,
                        parameter = %param.name,
                        location = ?param.location,
                        "Skipping parameter outside path and query."
                    );
                    continue;
                }
            };
            if let Some(property) = self.parameter(site.document, &owner, param, synth)? {
                target.push(property);
            }
        }

        let body = self.body(site, &owner, synth)?;
        let (response, response_include) = self.response(site, synth, responses)?;

        let route = match config.mode {
            GenerationMode::ServiceClient => format!("micro_{}{}", doc.info.title, site.path),
            GenerationMode::ObjectModel => site.path.to_string(),
        };
        let route_impl = build_route_impl(&route, &path_params, &query_params, global)?;

        let mut request_includes = Vec::new();
        let mut seen = BTreeSet::new();
        let types = path_params
            .iter()
            .chain(&query_params)
            .chain(body.as_ref())
            .map(|p| &p.ty)
            .chain(std::iter::once(&response));
        for ty in types {
            let include = self.resolver.include_for(ty);
            if !include.is_empty() && seen.insert(include.clone()) {
                request_includes.push(include);
            }
        }

        let is_auth = service.kind != ServiceKind::Basic
            || service.title.to_lowercase().contains("inventory")
            || site
                .operation
                .security
                .iter()
                .any(|requirement| requirement.contains_key("user"));

        tracing::debug!(endpoint = %global, route = %route, is_auth, "Declared endpoint.");
        Ok(EndpointDeclaration {
            global_name: global.clone(),
            subsystem_name: site.names.subsystem.clone(),
            owner: service.subsystem_name(config.mode),
            service_name: service.name,
            verb: site.verb,
            path: site.path.to_string(),
            route,
            is_auth,
            path_params,
            query_params,
            body,
            response,
            request_includes,
            response_include,
            route_impl,
        })
    }

    fn parameter(
        &self,
        document: usize,
        owner: &str,
        param: &Parameter,
        synth: &mut WrapperSynthesizer,
    ) -> Result<Option<PropertyDeclaration>, GenError> {
        let Some(declared) = param.schema.as_ref() else {
            tracing::warn!(parameter = %param.name, "Parameter has no schema, skipping.");
            return Ok(None);
        };
        let retyped = param
            .object_id
            .as_ref()
            .filter(|object_id| object_id.schema_type.is_some())
            .map(|object_id| Schema {
                schema_type: object_id.schema_type.clone(),
                format: object_id.format.clone(),
                semantic_type: declared.semantic_type.clone(),
                ..Schema::default()
            });
        let schema = retyped.as_ref().unwrap_or(declared);

        let handle = field_handle(owner, &param.name);
        let Some(resolved) = self
            .resolver
            .resolve(document, &handle, schema, ResolveFlags::NONE)?
        else {
            tracing::warn!(handle = %handle, "Parameter matches no supported shape, skipping.");
            return Ok(None);
        };
        let title = &self.resolver.document(document).info.title;
        synth.register_field(self.resolver, &handle, &resolved, title)?;

        let wire = self.semantic.get(&handle).map(|_| "FString".to_string());
        Ok(Some(
            PropertyDeclaration::new(&param.name, resolved.overridden, wire)
                .with_comment(param.description.as_deref()),
        ))
    }

    fn body(
        &self,
        site: OperationSite<'_>,
        owner: &str,
        synth: &mut WrapperSynthesizer,
    ) -> Result<Option<PropertyDeclaration>, GenError> {
        let Some(schema) = site
            .operation
            .request_body
            .as_ref()
            .and_then(|body| body.content.get(JSON_CONTENT))
            .and_then(|media| media.schema.as_ref())
        else {
            return Ok(None);
        };
        let Some(resolved) = self.resolver.resolve_non_optional(site.document, schema)? else {
            tracing::warn!(endpoint = %site.names.global, "Request body matches no supported shape, skipping.");
            return Ok(None);
        };
        let handle = field_handle(owner, "Body");
        let title = &self.resolver.document(site.document).info.title;
        synth.register_field(self.resolver, &handle, &resolved, title)?;
        Ok(Some(PropertyDeclaration::new("Body", resolved.overridden, None)))
    }

    fn response(
        &self,
        site: OperationSite<'_>,
        synth: &mut WrapperSynthesizer,
        responses: &mut ResponseRegistry,
    ) -> Result<(UnrealType, String), GenError> {
        let global = &site.names.global;
        let plain_text = || {
            let ty = UnrealType::PlainTextResponse;
            let include = self.resolver.include_for(&ty);
            (ty, include)
        };
        let Some(ok) = site.operation.responses.get("200") else {
            tracing::debug!(endpoint = %global, "No 200 response, using plain text.");
            return Ok(plain_text());
        };

        if let Some(schema) = ok.content.get(JSON_CONTENT).and_then(|m| m.schema.as_ref()) {
            let Some(resolved) = self.resolver.resolve_non_optional(site.document, schema)? else {
                tracing::warn!(endpoint = %global, "Response matches no supported shape, using plain text.");
                return Ok(plain_text());
            };
            let title = &self.resolver.document(site.document).info.title;
            let handle = field_handle(global, "Response");
            synth.register_field(self.resolver, &handle, &resolved, title)?;

            let ty = resolved.overridden;
            if schema.reference.is_some() && ty.is_uobject() {
                responses.register_json(ty.namespaced());
                let include = self.resolver.include_for(&ty);
                return Ok((ty, include));
            }

            let wrapper = SerializableDeclaration::primitive_response(self.resolver, &format!("{global}Response"), ty);
            let wrapper_ty = wrapper.ty.clone();
            responses.register_wrapper(wrapper);
            let include = self.resolver.include_for(&wrapper_ty);
            return Ok((wrapper_ty, include));
        }

        if !ok.content.contains_key(TEXT_CONTENT) {
            tracing::debug!(endpoint = %global, "Response has no JSON content, using plain text.");
        }
        Ok(plain_text())
    }
}
