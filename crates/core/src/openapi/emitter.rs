//! Unreal code generation for a set of OpenAPI documents.
//!
//! This module wires the IR passes together. The pipeline is:
//! 1. Name: schema overlaps, endpoint collisions, required flags
//! 2. Resolve: semantic field map over the shared [`Resolver`]
//! 3. Declare: subsystems and endpoints, then schema types and helper types
//! 4. Emit: every declaration through its templates, memo file last
//!
//! Nothing is returned until every declaration rendered, so a fatal error
//! never leaves a partial file set behind.

use std::collections::BTreeMap;

use unreal_apigen_common::{GenerationPassMemo, GeneratorConfig};

use crate::error::GenError;
use crate::openapi::ir::collisions::{EndpointNaming, RequiredFields, SchemaNamer};
use crate::openapi::ir::decl::{
    build_schema_types, build_subsystems, EndpointBuilder, EndpointDeclaration, PropertyDeclaration,
    ResponseRegistry, SerializableDeclaration, SubsystemDeclaration,
};
use crate::openapi::ir::emit::{render, ReplacementTable, Replacements};
use crate::openapi::ir::resolve::{Resolver, SemanticFields};
use crate::openapi::ir::templates::{
    Template, ARRAY_HEADER, ARRAY_SOURCE, ENUM_HEADER, MAP_HEADER, MAP_SOURCE, NODE_HEADER,
    NODE_SOURCE, OPTIONAL_HEADER, OPTIONAL_LIBRARY_HEADER, OPTIONAL_LIBRARY_SOURCE,
    OPTIONAL_SOURCE, REQUEST_HEADER, REQUEST_SOURCE, SERIALIZABLE_HEADER,
    SERIALIZABLE_LIBRARY_HEADER, SERIALIZABLE_LIBRARY_SOURCE, SERIALIZABLE_SOURCE,
    SUBSYSTEM_HEADER, SUBSYSTEM_SOURCE,
};
use crate::openapi::ir::wrappers::WrapperSynthesizer;
use crate::openapi::spec::{ordered_schemas, OpenApiDocument};

/// One file of generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root.
    pub path: String,
    /// File contents.
    pub contents: String,
}

/// Everything a generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Files in emission order. The memo file is last.
    pub files: Vec<GeneratedFile>,
    /// The input memo plus every type this run emitted.
    pub memo: GenerationPassMemo,
}

/// Generate Unreal headers and sources for `documents`.
///
/// Types already listed in `memo` are referenced through their recorded
/// header but not emitted again.
pub fn generate(
    documents: &[OpenApiDocument],
    config: &GeneratorConfig,
    memo: &GenerationPassMemo,
) -> Result<GenerationOutput, GenError> {
    let schemas = ordered_schemas(documents);
    let namer = SchemaNamer::new(documents, &schemas, config);
    let naming = EndpointNaming::build(documents, config)?;
    let required = RequiredFields::build(documents, &schemas, &namer, &naming, config.mode);
    let resolver = Resolver::new(documents, config, memo, &namer, &required);
    let semantic = SemanticFields::build(&resolver, documents, &schemas, &naming, config.mode)?;

    let mut synth = WrapperSynthesizer::new();
    let mut responses = ResponseRegistry::default();
    let builder = EndpointBuilder::new(&resolver, &semantic);
    let subsystems = build_subsystems(&builder, documents, &naming, config, &mut synth, &mut responses)?;

    let mut serializables =
        build_schema_types(&resolver, &schemas, &semantic, &mut synth, &responses.bodies)?;
    for wrapper in &synth.polymorphic {
        let mut declaration = SerializableDeclaration::polymorphic(&resolver, wrapper);
        let ns = declaration.namespaced();
        if serializables.iter().any(|s| s.namespaced() == ns) {
            continue;
        }
        if let Some(body) = responses.bodies.get(&ns) {
            declaration.response_body = *body;
        }
        serializables.push(declaration);
    }
    for wrapper in responses.wrappers {
        if !serializables.iter().any(|s| s.namespaced() == wrapper.namespaced()) {
            serializables.push(wrapper);
        }
    }

    let mut sink = FileSink::new(config, memo);
    sink.emit_helpers(&synth)?;
    sink.emit_serializables(&serializables)?;
    sink.emit_subsystems(&subsystems)?;

    let body_fields: BTreeMap<String, &[PropertyDeclaration]> = serializables
        .iter()
        .filter(|s| !memo.contains(&s.namespaced()))
        .map(|s| (s.namespaced(), s.properties.as_slice()))
        .collect();
    for endpoint in subsystems.iter().flat_map(SubsystemDeclaration::all_endpoints) {
        sink.emit_endpoint(endpoint, &body_fields)?;
    }

    sink.finish()
}

/// Accumulates rendered files and the memo entries of emitted types.
#[derive(Debug)]
struct FileSink<'a> {
    config: &'a GeneratorConfig,
    previous: &'a GenerationPassMemo,
    memo: GenerationPassMemo,
    files: Vec<GeneratedFile>,
}

impl<'a> FileSink<'a> {
    fn new(config: &'a GeneratorConfig, previous: &'a GenerationPassMemo) -> Self {
        Self {
            config,
            previous,
            memo: previous.clone(),
            files: Vec::new(),
        }
    }

    fn push(&mut self, path: String, template: &Template, table: &Replacements) -> Result<(), GenError> {
        let contents = render(template, table)?;
        self.files.push(GeneratedFile { path, contents });
        Ok(())
    }

    /// Whether a previous pass already produced `ns`.
    fn is_memoized(&self, ns: &str) -> bool {
        if self.previous.contains(ns) {
            tracing::debug!(ns, "Type generated by a previous pass, skipping.");
            return true;
        }
        false
    }

    fn record(&mut self, ns: String, header: &str) {
        tracing::debug!(ns = %ns, path = %header, "Mapped type to header.");
        self.memo.insert(ns, header);
    }

    /// Optionals, array and map wrappers, then enums.
    fn emit_helpers(&mut self, synth: &WrapperSynthesizer) -> Result<(), GenError> {
        let (hdr, cpp) = (self.config.header_path.clone(), self.config.cpp_path.clone());

        for optional in &synth.optionals {
            let ns = optional.ty.namespaced();
            if self.is_memoized(&ns) {
                continue;
            }
            let table = optional.replacements(self.config);
            let header = format!("{hdr}AutoGen/Optionals/{ns}.h");
            self.push(header.clone(), &OPTIONAL_HEADER, &table)?;
            self.push(format!("{cpp}AutoGen/Optionals/{ns}.cpp"), &OPTIONAL_SOURCE, &table)?;
            self.push(format!("{hdr}AutoGen/Optionals/{ns}Library.h"), &OPTIONAL_LIBRARY_HEADER, &table)?;
            self.push(format!("{cpp}AutoGen/Optionals/{ns}Library.cpp"), &OPTIONAL_LIBRARY_SOURCE, &table)?;
            self.record(ns, &header);
        }

        let containers = [
            ("Arrays", &synth.arrays, &ARRAY_HEADER, &ARRAY_SOURCE),
            ("Maps", &synth.maps, &MAP_HEADER, &MAP_SOURCE),
        ];
        for (folder, wrappers, header_template, source_template) in containers {
            for wrapper in wrappers {
                let ns = wrapper.ty.namespaced();
                if self.is_memoized(&ns) {
                    continue;
                }
                let table = wrapper.replacements(self.config);
                let header = format!("{hdr}AutoGen/{folder}/{ns}.h");
                self.push(header.clone(), header_template, &table)?;
                self.push(format!("{cpp}AutoGen/{folder}/{ns}.cpp"), source_template, &table)?;
                self.record(ns, &header);
            }
        }

        for declaration in &synth.enums {
            let ns = declaration.ty.namespaced();
            if self.is_memoized(&ns) {
                continue;
            }
            let header = format!("{hdr}AutoGen/Enums/{ns}.h");
            self.push(header.clone(), &ENUM_HEADER, &declaration.replacements(self.config))?;
            self.record(ns, &header);
        }
        Ok(())
    }

    fn emit_serializables(&mut self, serializables: &[SerializableDeclaration]) -> Result<(), GenError> {
        let (hdr, cpp) = (self.config.header_path.clone(), self.config.cpp_path.clone());
        for declaration in serializables {
            let ns = declaration.namespaced();
            if self.is_memoized(&ns) {
                continue;
            }
            let table = declaration.replacements(self.config)?;
            let header = format!("{hdr}AutoGen/{ns}.h");
            self.push(header.clone(), &SERIALIZABLE_HEADER, &table)?;
            self.push(format!("{cpp}AutoGen/{ns}.cpp"), &SERIALIZABLE_SOURCE, &table)?;
            self.push(format!("{hdr}AutoGen/{ns}Library.h"), &SERIALIZABLE_LIBRARY_HEADER, &table)?;
            self.push(format!("{cpp}AutoGen/{ns}Library.cpp"), &SERIALIZABLE_LIBRARY_SOURCE, &table)?;
            self.record(ns, &header);
        }
        Ok(())
    }

    fn emit_subsystems(&mut self, subsystems: &[SubsystemDeclaration]) -> Result<(), GenError> {
        for subsystem in subsystems {
            let name = &subsystem.subsystem_name;
            self.push(
                format!("{}AutoGen/SubSystems/Beam{name}Api.h", self.config.header_path),
                &SUBSYSTEM_HEADER,
                &subsystem.header_replacements(self.config)?,
            )?;
            self.push(
                format!("{}AutoGen/SubSystems/Beam{name}Api.cpp", self.config.cpp_path),
                &SUBSYSTEM_SOURCE,
                &subsystem.source_replacements(self.config)?,
            )?;
        }
        Ok(())
    }

    /// Request UObject and Blueprint node of one endpoint.
    fn emit_endpoint(
        &mut self,
        endpoint: &EndpointDeclaration,
        body_fields: &BTreeMap<String, &[PropertyDeclaration]>,
    ) -> Result<(), GenError> {
        let fields = endpoint
            .body
            .as_ref()
            .and_then(|body| body_fields.get(&body.ty.namespaced()))
            .copied();
        let table = endpoint.request_replacements(self.config, fields)?;
        let (owner, global) = (&endpoint.owner, &endpoint.global_name);
        let config = self.config;

        self.push(
            format!("{}AutoGen/SubSystems/{owner}/{global}Request.h", config.header_path),
            &REQUEST_HEADER,
            &table,
        )?;
        self.push(
            format!("{}AutoGen/SubSystems/{owner}/{global}Request.cpp", config.cpp_path),
            &REQUEST_SOURCE,
            &table,
        )?;
        self.push(
            format!("{}AutoGen/{owner}/K2BeamNode_ApiRequest_{global}.h", config.blueprint_header_path),
            &NODE_HEADER,
            &table,
        )?;
        self.push(
            format!("{}AutoGen/{owner}/K2BeamNode_ApiRequest_{global}.cpp", config.blueprint_cpp_path),
            &NODE_SOURCE,
            &table,
        )
    }

    /// Append the memo file and hand everything back.
    fn finish(mut self) -> Result<GenerationOutput, GenError> {
        let contents = self
            .memo
            .to_json()
            .map_err(|message| GenError::Memo { message })?;
        self.files.push(GeneratedFile {
            path: self.config.memo_file_name.clone(),
            contents,
        });
        tracing::info!(files = self.files.len(), types = self.memo.len(), "Generation finished.");
        Ok(GenerationOutput {
            files: self.files,
            memo: self.memo,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn document(json: &str) -> OpenApiDocument {
        OpenApiDocument::from_json("test", json).unwrap()
    }

    const INVENTORY: &str = r##"{
        "openapi": "3.0.1",
        "info": { "title": "inventory basic", "version": "1.0" },
        "paths": {
            "/basic/inventory/items": {
                "get": {
                    "parameters": [
                        { "name": "scope", "in": "query", "required": false, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ItemList" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ItemList": {
                    "type": "object",
                    "required": ["items"],
                    "properties": {
                        "items": { "type": "array", "items": { "$ref": "#/components/schemas/Item" } }
                    }
                },
                "Item": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "string" },
                        "count": { "type": "integer", "format": "int32" }
                    }
                }
            }
        }
    }"##;

    fn paths(output: &GenerationOutput) -> Vec<&str> {
        output.files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_emission_order_and_memo() {
        let config = GeneratorConfig::default();
        let output = generate(&[document(INVENTORY)], &config, &GenerationPassMemo::new()).unwrap();
        let paths = paths(&output);

        assert_eq!(paths[0], "BeamableCore/Public/AutoGen/Optionals/OptionalString.h");
        assert!(paths.contains(&"BeamableCore/Public/AutoGen/ItemList.h"));
        assert!(paths.contains(&"BeamableCore/Private/AutoGen/SubSystems/BeamInventoryApi.cpp"));
        assert!(paths.contains(
            &"BeamableCoreBlueprintNodes/Public/BeamFlow/ApiRequest/AutoGen/Inventory/K2BeamNode_ApiRequest_GetItems.h"
        ));
        assert_eq!(*paths.last().unwrap(), "BeamableCore_GenerationPass.json");

        let optional = paths.iter().position(|p| p.contains("Optionals/")).unwrap();
        let serializable = paths.iter().position(|p| p.ends_with("AutoGen/Item.h")).unwrap();
        let subsystem = paths.iter().position(|p| p.contains("BeamInventoryApi.h")).unwrap();
        let request = paths.iter().position(|p| p.ends_with("Request.h")).unwrap();
        assert!(optional < serializable && serializable < subsystem && subsystem < request);

        assert_eq!(
            output.memo.header_path("Item"),
            Some("BeamableCore/Public/AutoGen/Item.h")
        );
        assert!(output.memo.contains("OptionalInt32"));
        assert!(output.files.iter().all(|f| !f.contents.contains('₢')));
    }

    #[test]
    fn test_memoized_types_are_not_emitted() {
        let config = GeneratorConfig::default();
        let mut memo = GenerationPassMemo::new();
        memo.insert("Item".to_string(), "CoreSdk/Public/AutoGen/Item.h");

        let output = generate(&[document(INVENTORY)], &config, &memo).unwrap();
        assert!(!paths(&output).contains(&"BeamableCore/Public/AutoGen/Item.h"));
        assert_eq!(output.memo.header_path("Item"), Some("CoreSdk/Public/AutoGen/Item.h"));

        let list = output
            .files
            .iter()
            .find(|f| f.path == "BeamableCore/Public/AutoGen/ItemList.h")
            .unwrap();
        assert!(list.contents.contains("#include \"CoreSdk/Public/AutoGen/Item.h\""));
    }

    #[test]
    fn test_memo_file_is_flat_json() {
        let output = generate(
            &[document(INVENTORY)],
            &GeneratorConfig::default(),
            &GenerationPassMemo::new(),
        )
        .unwrap();
        let memo_file = output.files.last().unwrap();
        let reloaded = GenerationPassMemo::from_json(&memo_file.contents).unwrap();
        assert_eq!(reloaded.len(), output.memo.len());
    }
}
