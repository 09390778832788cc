use crate::collector::ReferenceCollector;
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::loader::{self, SourceFile};
use crate::members;
use crate::normalize::NormalizeOptions;
use crate::parser::CSharpParser;
use crate::semantic::SemanticModel;
use crate::types::ClassDescriptor;
use crate::walker::{self, ClassDeclaration};
use std::path::Path;

/// Turns C# source files into [`ClassDescriptor`]s
pub struct Extractor {
    parser: CSharpParser,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: CSharpParser::new()?,
            config,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_file(&mut self, path: &Path) -> Result<Vec<ClassDescriptor>> {
        let source = loader::load(path)?;
        self.extract(&source)
    }

    pub fn extract(&mut self, source: &SourceFile) -> Result<Vec<ClassDescriptor>> {
        self.extract_source(&source.path.display().to_string(), &source.text)
    }

    /// Describe every class-like declaration of `text`; `file_path` is reported as given
    pub fn extract_source(&mut self, file_path: &str, text: &str) -> Result<Vec<ClassDescriptor>> {
        let tree = self.parser.parse(text)?;
        let model = SemanticModel::build(&tree, text);
        let usings = model.root_using_directives();
        let options = self.config.normalize_options();

        let mut classes = Vec::new();
        for declaration in walker::class_declarations(&model) {
            let symbol = model.symbol(declaration.id);
            if !self
                .config
                .profile
                .includes_type(symbol.is_abstract, symbol.is_static)
            {
                log::debug!(
                    "Profile {} skips {}",
                    self.config.profile,
                    model.display_name(declaration.id)
                );
                continue;
            }
            classes.push(self.describe(&model, declaration, file_path, &usings, &options));
        }

        log::info!(
            "Extracted {} class descriptors from {file_path}",
            classes.len()
        );
        Ok(classes)
    }

    fn describe<'t>(
        &self,
        model: &SemanticModel<'t>,
        class: ClassDeclaration<'t>,
        file_path: &str,
        usings: &[String],
        options: &NormalizeOptions,
    ) -> ClassDescriptor {
        let config = &self.config;
        let symbol = model.symbol(class.id);
        let mut collector = ReferenceCollector::new(model, options, config.follow_type_arguments);

        let constructors = members::constructors(model, class.node, config);
        let methods = members::methods(model, class.node, config, options, &mut collector);
        let properties = members::properties(model, class.node, &mut collector);
        for ty in collector.member_types(class.node) {
            collector.visit(&ty);
        }
        for ty in model.base_types(class.id) {
            collector.visit(&ty);
        }

        let referenced_type_definitions = collector.into_definitions();
        log::debug!(
            "{}: {} methods, {} referenced types",
            model.display_name(class.id),
            methods.len(),
            referenced_type_definitions.len()
        );

        ClassDescriptor {
            file_path: file_path.to_string(),
            namespace_name: symbol
                .namespace
                .clone()
                .unwrap_or_else(|| config.namespace_sentinel.clone()),
            class_name: symbol.name.clone(),
            is_static: symbol.is_static,
            is_abstract: symbol.is_abstract,
            constructors,
            methods,
            properties,
            using_directives: usings.to_vec(),
            referenced_type_definitions,
        }
    }
}
