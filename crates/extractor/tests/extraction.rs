//! End-to-end extraction over realistic C# files

use cs_structure_extractor::{
    ClassDescriptor, ExtractError, ExtractionProfile, Extractor, ExtractorConfig,
};
use pretty_assertions::assert_eq;
use std::io::Write;

const SHOP: &str = r#"using System;
using System.Collections.Generic;

namespace Shop.Model
{
    public class Customer
    {
        public string Name { get; set; }
        public Order LastOrder { get; set; }
    }

    public class Order
    {
        public Customer Buyer { get; set; }
        public List<Line> Lines { get; set; }
    }

    public class Line
    {
        public decimal Price { get; set; }
    }

    public abstract class Repository
    {
        public abstract Order Find(int id);
    }

    public class OrderService
    {
        private readonly Repository _repository;

        public OrderService(Repository repository)
        {
            if (repository == null)
            {
                throw new ArgumentNullException(nameof(repository));
            }
            _repository = repository;
        }

        private OrderService() { }

        public Customer Owner(int id)
        {
            var order = _repository.Find(id);
            return order.Buyer;
        }
    }
}
"#;

fn extract(config: ExtractorConfig, text: &str) -> Vec<ClassDescriptor> {
    Extractor::new(config)
        .unwrap()
        .extract_source("Shop.cs", text)
        .unwrap()
}

fn class<'a>(classes: &'a [ClassDescriptor], name: &str) -> &'a ClassDescriptor {
    classes
        .iter()
        .find(|c| c.class_name == name)
        .unwrap_or_else(|| panic!("class {name} not extracted"))
}

fn keys(class: &ClassDescriptor) -> Vec<&str> {
    class
        .referenced_type_definitions
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn test_file_without_classes_yields_empty_array() {
    let classes = extract(
        ExtractorConfig::default(),
        "namespace Empty { public interface IThing { } public enum Kind { A, B } }",
    );
    assert!(classes.is_empty());
}

#[test]
fn test_classes_are_reported_in_source_order() {
    let classes = extract(ExtractorConfig::default(), SHOP);
    let names: Vec<&str> = classes.iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Customer", "Order", "Line", "Repository", "OrderService"]
    );
    for class in &classes {
        assert_eq!(class.file_path, "Shop.cs");
        assert_eq!(class.namespace_name, "Shop.Model");
        assert_eq!(
            class.using_directives,
            vec!["using System;", "using System.Collections.Generic;"]
        );
    }
    assert!(class(&classes, "Repository").is_abstract);
}

#[test]
fn test_public_constructor_with_null_guard() {
    let classes = extract(ExtractorConfig::default(), SHOP);
    let service = class(&classes, "OrderService");

    assert_eq!(service.constructors.len(), 1);
    let ctor = &service.constructors[0];
    assert_eq!(ctor.signature, "public OrderService(Repository repository)");
    assert_eq!(ctor.parameters, vec!["Repository repository"]);
    assert_eq!(ctor.exception_conditions.len(), 1);
    assert_eq!(ctor.exception_conditions[0].condition_expression, "repository == null");
    assert_eq!(
        ctor.exception_conditions[0].exception_type,
        "ArgumentNullException"
    );

    assert!(class(&classes, "Line").constructors.is_empty());
}

#[test]
fn test_method_dependencies_and_referenced_types() {
    let classes = extract(ExtractorConfig::default(), SHOP);
    let service = class(&classes, "OrderService");

    assert_eq!(service.methods.len(), 1);
    let owner = &service.methods[0];
    assert_eq!(owner.name, "Owner");
    assert_eq!(owner.return_type, "Shop.Model.Customer");
    assert_eq!(owner.dependency_types, vec!["Shop.Model.Order"]);
    assert!(owner.source_code.starts_with("public Customer Owner(int id)\n{\n"));

    assert_eq!(
        keys(service),
        vec![
            "Shop.Model.Order",
            "Shop.Model.Customer",
            "Shop.Model.Line",
            "Shop.Model.Repository"
        ]
    );
    assert!(service.referenced_type_definitions["Shop.Model.Line"]
        .starts_with("public class Line\n{"));
}

#[test]
fn test_reference_cycle_yields_one_entry_per_type() {
    let classes = extract(ExtractorConfig::default(), SHOP);
    let customer = class(&classes, "Customer");
    assert_eq!(
        keys(customer),
        vec!["Shop.Model.Order", "Shop.Model.Customer", "Shop.Model.Line"]
    );

    let properties: Vec<(&str, &str)> = customer
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.type_name.as_str()))
        .collect();
    assert_eq!(
        properties,
        vec![("Name", "string"), ("LastOrder", "Shop.Model.Order")]
    );
}

#[test]
fn test_external_property_type_is_not_collected() {
    let text = r"
namespace Billing
{
    public class Invoice
    {
        public Vendor.Sdk.Client Client { get; set; }
        public Guid Id { get; set; }
    }
}";
    let classes = extract(ExtractorConfig::default(), text);
    let invoice = class(&classes, "Invoice");
    assert_eq!(invoice.properties[0].type_name, "Vendor.Sdk.Client");
    assert_eq!(invoice.properties[1].type_name, "Guid");
    assert!(invoice.referenced_type_definitions.is_empty());
}

#[test]
fn test_global_namespace_uses_sentinel() {
    let text = "public class Loose { public int Count { get; set; } }";
    let classes = extract(ExtractorConfig::default(), text);
    assert_eq!(classes[0].namespace_name, "Global");

    let config = ExtractorConfig {
        namespace_sentinel: "<global>".to_string(),
        ..ExtractorConfig::default()
    };
    let classes = extract(config, text);
    assert_eq!(classes[0].namespace_name, "<global>");
}

#[test]
fn test_public_surface_profile_skips_abstract_types() {
    let config = ExtractorConfig {
        profile: ExtractionProfile::PublicSurface,
        ..ExtractorConfig::default()
    };
    let classes = extract(config, SHOP);
    assert!(classes.iter().all(|c| c.class_name != "Repository"));
    assert_eq!(classes.len(), 4);
}

#[test]
fn test_extraction_is_deterministic() {
    let first = extract(ExtractorConfig::default(), SHOP);
    let second = extract(ExtractorConfig::default(), SHOP);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_extract_file_reads_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".cs").tempfile().unwrap();
    file.write_all(SHOP.as_bytes()).unwrap();

    let mut extractor = Extractor::new(ExtractorConfig::default()).unwrap();
    let classes = extractor.extract_file(file.path()).unwrap();
    assert_eq!(classes.len(), 5);
    assert_eq!(classes[0].file_path, file.path().display().to_string());
}

#[test]
fn test_missing_file_is_input_error() {
    let mut extractor = Extractor::new(ExtractorConfig::default()).unwrap();
    let err = extractor
        .extract_file(std::path::Path::new("/definitely/not/here/Order.cs"))
        .unwrap_err();
    assert!(matches!(err, ExtractError::NotFound(_)));
    assert!(err.is_input_error());
}
