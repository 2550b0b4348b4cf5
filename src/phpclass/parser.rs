use std::{fs::read_to_string, path::Path, sync::OnceLock};

use anyhow::{anyhow, Context};
use regex::Regex;

use super::definition::{ClassDefinition, KEY_FIELD};

pub const SUPPORTED_EXTENSIONS: [&str; 1] = ["php"];

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?i:class)\s+(\w+)[^{]*\{").expect("valid regex"))
}

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"public \$(\w+)\s*(?:=[^;]*)?;").expect("valid regex"))
}

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn table_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"private \$table_name = "(.*)";"#).expect("valid regex"))
}

fn first_capture<'a>(regex: &Regex, line: &'a str) -> Option<&'a str> {
    regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|capture| capture.as_str().trim())
        .filter(|capture| !capture.is_empty())
}

/// Class name declared on the line, e.g. `Class Feature{` gives `Feature`.
pub fn find_class(line: &str) -> Option<&str> {
    first_capture(class_regex(), line)
}

/// Name of a public property declared on the line, without the `$`.
pub fn find_field(line: &str) -> Option<&str> {
    first_capture(field_regex(), line)
}

pub fn find_table_name(line: &str) -> Option<&str> {
    first_capture(table_name_regex(), line)
}

pub fn is_supported_file(filepath: &Path) -> bool {
    match filepath.extension().and_then(|extension| extension.to_str()) {
        Some(extension) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

/// Parses the contents of an incomplete PHP class.
///
/// The last class declaration and the last `table_name` win, public
/// properties accumulate in declaration order. Without a `table_name` the
/// table is assumed to be the pluralized class name.
pub fn parse_class(contents: &str) -> anyhow::Result<ClassDefinition> {
    let mut class_name = None;
    let mut table_name = None;
    let mut fields = Vec::new();
    for line in contents.lines() {
        if let Some(name) = find_class(line) {
            class_name = Some(name.to_string());
        }
        if let Some(field) = find_field(line) {
            fields.push(field.to_string());
        }
        if let Some(name) = find_table_name(line) {
            table_name = Some(name.to_string());
        }
    }

    let class_name = class_name.ok_or_else(|| anyhow!("No class declaration found"))?;
    if fields.is_empty() {
        return Err(anyhow!("Class {} declares no public properties", class_name));
    }
    if fields.iter().all(|field| field == KEY_FIELD) {
        return Err(anyhow!(
            "Class {} declares no public properties besides {}",
            class_name,
            KEY_FIELD
        ));
    }
    let table_name = match table_name {
        Some(table_name) => table_name,
        None => {
            let table_name = format!("{}s", class_name);
            log::warn!(
                "Class {} has no table_name property, assuming {}",
                class_name,
                table_name
            );
            table_name
        }
    };

    log::info!("Class name: {}", class_name);
    log::info!("Table name: {}", table_name);
    log::info!("Fields: {}", fields.join(", "));
    Ok(ClassDefinition {
        class_name,
        fields,
        table_name,
    })
}

pub fn read_class_file(filepath: &Path) -> anyhow::Result<ClassDefinition> {
    if !is_supported_file(filepath) {
        return Err(anyhow!(
            "Invalid file type {:?}, only .{} inputs are supported",
            filepath,
            SUPPORTED_EXTENSIONS.join(", .")
        ));
    }
    if !filepath.exists() {
        return Err(anyhow!("Input file {:?} not found", filepath));
    }
    let contents =
        read_to_string(filepath).with_context(|| format!("Reading {:?}", filepath))?;
    parse_class(&contents).with_context(|| format!("Parsing {:?}", filepath))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rstest::rstest;
    use testdir::testdir;

    use crate::{
        phpclass::definition::ClassDefinition,
        record::{feature::Feature, Record},
    };

    use super::{
        find_class, find_field, find_table_name, is_supported_file, parse_class,
        read_class_file,
    };

    const FEATURE_CLASS: &str = r#"<?php
    Class Feature{
        public $ID;
        public $SiteID;
        public $Name;
        public $FeatureType;
        public $Diameter;
        public $DiameterMin;
        public $DiameterMax;
        public $FeatureQuantity;
        public $LengthMin;
        public $WidthMin;
        public $WidthMax;
        public $Depth;
        public $Shape;
        private $conn;
        private $table_name = "Features";
    }
?>"#;

    #[rstest]
    #[case("    Class Feature{", Some("Feature"))]
    #[case("class Site {", Some("Site"))]
    #[case("class Feature extends Model{", Some("Feature"))]
    #[case("final class Well implements JsonSerializable {", Some("Well"))]
    #[case("    public $Name;", None)]
    #[case("{", None)]
    fn test_find_class(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_class(line), expected);
    }

    #[rstest]
    #[case("        public $Name; ", Some("Name"))]
    #[case("public $DiameterMin;", Some("DiameterMin"))]
    #[case("public $Shape = 'Circular';", Some("Shape"))]
    #[case("        private $conn;", None)]
    #[case("    Class Feature{", None)]
    fn test_find_field(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_field(line), expected);
    }

    #[rstest]
    #[case(r#"        private $table_name = "Features";"#, Some("Features"))]
    #[case(r#"private $table_name = "";"#, None)]
    #[case("        private $conn;", None)]
    fn test_find_table_name(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_table_name(line), expected);
    }

    #[rstest]
    #[case("Feature.php", true)]
    #[case("Feature.PHP", true)]
    #[case("dir/Feature.Php", true)]
    #[case("Feature.txt", false)]
    #[case("php", false)]
    fn test_is_supported_file(#[case] filepath: &str, #[case] expected: bool) {
        assert_eq!(is_supported_file(Path::new(filepath)), expected);
    }

    #[rstest]
    fn test_parse_feature_class_matches_record() {
        let definition = parse_class(FEATURE_CLASS).unwrap();
        assert_eq!(definition, ClassDefinition::for_record::<Feature>());
        assert_eq!(definition.fields, Feature::COLUMNS);
    }

    #[rstest]
    fn test_parse_without_table_name_pluralizes() {
        let definition = parse_class("class Site{\n public $ID;\n public $Name;\n}").unwrap();
        assert_eq!(definition.table_name, "Sites");
        assert_eq!(definition.fields, vec!["ID", "Name"]);
    }

    #[rstest]
    #[case("public $ID;\n")]
    #[case("class Empty{\n private $conn;\n}")]
    #[case("class Tag{\n public $ID;\n private $table_name = \"Tags\";\n}")]
    fn test_parse_rejects_incomplete_class(#[case] contents: &str) {
        assert!(parse_class(contents).is_err());
    }

    #[rstest]
    fn test_read_class_file() {
        let test_dir = testdir!();
        let filepath = test_dir.join("sampleClass.php");
        fs::write(&filepath, FEATURE_CLASS).unwrap();
        let definition = read_class_file(&filepath).unwrap();
        assert_eq!(definition.class_name, "Feature");
        assert_eq!(definition.output_file_name(), "Feature.php");
        assert_eq!(definition.table_name, "Features");
    }

    #[rstest]
    fn test_read_class_file_rejects_other_types() {
        let test_dir = testdir!();
        let filepath = test_dir.join("sampleClass.txt");
        fs::write(&filepath, FEATURE_CLASS).unwrap();
        assert!(read_class_file(&filepath).is_err());
    }

    #[rstest]
    fn test_read_missing_class_file() {
        let test_dir = testdir!();
        assert!(read_class_file(&test_dir.join("missing.php")).is_err());
    }
}
