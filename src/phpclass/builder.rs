use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};

use super::{
    comment::{class_comment, MethodComment},
    definition::ClassDefinition,
};

/// Renders a PHP class with CRUD methods for a [`ClassDefinition`].
pub struct PhpClassBuilder<'a> {
    definition: &'a ClassDefinition,
    comment_width: usize,
    out: String,
}

impl<'a> PhpClassBuilder<'a> {
    pub fn new(definition: &'a ClassDefinition, comment_width: usize) -> Self {
        Self {
            definition,
            comment_width,
            out: String::new(),
        }
    }

    /// Renders the complete class file.
    pub fn render(mut self) -> String {
        let steps: [(&str, fn(&mut Self)); 12] = [
            ("opening", Self::opening),
            ("constructor", Self::constructor),
            ("read", Self::read),
            ("readOne", Self::read_one),
            ("readPaging", Self::read_paging),
            ("count", Self::count),
            ("checkIfExists", Self::check_if_exists),
            ("getIfExists", Self::get_if_exists),
            ("insert", Self::insert),
            ("update", Self::update),
            ("remove", Self::remove),
            ("closing", Self::closing),
        ];
        for (name, step) in steps {
            log::debug!("Creating {} for {}", name, self.definition.class_name);
            step(&mut self);
        }
        self.out
    }

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn comment(&mut self, comment: MethodComment) {
        let rendered = comment.render(self.comment_width);
        self.out.push_str(&rendered);
    }

    fn definition(&self) -> &'a ClassDefinition {
        self.definition
    }

    fn name(&self) -> String {
        self.definition.lowercase_name()
    }

    fn key(&self) -> &'static str {
        self.definition.key_field()
    }

    fn prepare_and_execute(&mut self) {
        self.line(3, "//prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.line(3, "$stmt->execute();");
    }

    /// `WHERE a = :a AND b = :b ...` over every field.
    fn match_all_fields(&mut self) {
        let fields = &self.definition().fields;
        let last = fields.len().saturating_sub(1);
        for (index, field) in fields.iter().enumerate() {
            let keyword = if index == 0 { "WHERE" } else { "AND" };
            let end = if index == last { "\";" } else { "" };
            self.line(4, &format!("{} {} = :{}{}", keyword, field, field, end));
        }
    }

    fn bind_fields<'f>(&mut self, fields: impl IntoIterator<Item = &'f str>) {
        for field in fields {
            self.line(
                3,
                &format!("$stmt->bindParam(\":{}\", $this->{});", field, field),
            );
        }
    }

    fn sanitize_fields<'f>(&mut self, fields: impl IntoIterator<Item = &'f str>) {
        self.line(3, "//Sanitize");
        for field in fields {
            self.line(
                3,
                &format!(
                    "$this->{} = htmlspecialchars(strip_tags($this->{}));",
                    field, field
                ),
            );
        }
    }

    fn set_properties_from_row(&mut self) {
        for field in &self.definition().fields {
            self.line(3, &format!("$this->{} = $row['{}'];", field, field));
        }
    }

    fn execute_returning_bool(&mut self) {
        self.line(3, "if($stmt->execute())");
        self.line(3, "{");
        self.line(4, "return true;");
        self.line(3, "}");
        self.line(3, "return false;");
    }

    fn opening(&mut self) {
        self.out.push_str("<?php\n");
        let definition = self.definition();
        let comment = class_comment(&self.name(), self.comment_width);
        self.out.push_str(&comment);
        self.line(1, &format!("class {}", definition.class_name));
        self.line(1, "{");
        for field in &definition.fields {
            self.line(2, &format!("public ${};", field));
        }
        self.line(2, "private $conn;");
        self.line(
            2,
            &format!("private $table_name = \"{}\";", definition.table_name),
        );
        self.out.push('\n');
    }

    fn constructor(&mut self) {
        let name = self.name();
        let class_name = &self.definition().class_name;
        self.comment(
            MethodComment::new(
                format!("Constructor to create an {} object.", name),
                format!(
                    "Creates {} object by setting the $conn to a PDO object",
                    class_name
                ),
                class_name,
            )
            .with_param("PDO", "$db a configured pdo connection obj"),
        );
        self.line(2, "public function __construct($db)");
        self.line(2, "{");
        self.line(3, "$this->conn = $db;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn read(&mut self) {
        let name = self.name();
        self.comment(MethodComment::new(
            format!("Retrieves all records from {}s view.", name),
            format!(
                "Prepares and executes a simple Select statement to retrieve all records in the {} view.",
                name
            ),
            "PDOStatement",
        ));
        self.line(2, "//Selects all records");
        self.line(2, "public function read()");
        self.line(2, "{");
        self.line(3, "$query = \"SELECT *");
        self.line(4, "FROM \" . $this->table_name . \"");
        self.line(4, &format!("ORDER BY {} ASC\";", self.key()));
        self.out.push('\n');
        self.prepare_and_execute();
        self.out.push('\n');
        self.line(3, "return $stmt;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn read_one(&mut self) {
        let name = self.name();
        let key = self.key();
        self.comment(MethodComment::new(
            format!("Retrieves one {} record by ID", name),
            format!(
                "Prepares and executes a simple Select statement retrieving all values for one record and updates the {} object.",
                name
            ),
            "void",
        ));
        self.line(2, "public function readOne() : void");
        self.line(2, "{");
        self.line(3, "//query to read single record");
        self.line(3, "$query = \"SELECT *");
        self.line(4, "FROM \" . $this->table_name . \"");
        self.line(4, &format!("WHERE {} = ?", key));
        self.line(4, "LIMIT 0,1\";");
        self.out.push('\n');
        self.line(3, "//prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.out.push('\n');
        self.line(3, "//bind id of record to read");
        self.line(3, &format!("$stmt->bindParam(1, $this->{});", key));
        self.out.push('\n');
        self.line(3, "//execute query");
        self.line(3, "$stmt->execute();");
        self.out.push('\n');
        self.line(3, "//get retrieved row");
        self.line(3, "$row = $stmt->fetch(PDO::FETCH_ASSOC);");
        self.out.push('\n');
        self.set_properties_from_row();
        self.line(2, "}");
        self.out.push('\n');
    }

    fn read_paging(&mut self) {
        let name = self.name();
        self.comment(
            MethodComment::new(
                format!("Retrieves a certain number of records from {} view.", name),
                format!(
                    "Prepares and executes a simple Select statement to retrieve records starting from an id to a certain id in the {} view.",
                    name
                ),
                "PDOStatement",
            )
            .with_param("int", "$from_record_num first record to display")
            .with_param("int", "$records_per_page total number of records to retrieve"),
        );
        self.line(2, "public function readPaging($from_record_num, $records_per_page)");
        self.line(2, "{");
        self.line(3, "// select query");
        self.line(3, "$query = \"SELECT *");
        self.line(4, "FROM \" . $this->table_name . \"");
        self.line(4, &format!("ORDER BY {} ASC", self.key()));
        self.line(4, "LIMIT ?, ?\";");
        self.out.push('\n');
        self.line(3, "// prepare query statement");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.out.push('\n');
        self.line(3, "// bind variable values");
        self.line(3, "$stmt->bindParam(1, $from_record_num, PDO::PARAM_INT);");
        self.line(3, "$stmt->bindParam(2, $records_per_page, PDO::PARAM_INT);");
        self.out.push('\n');
        self.line(3, "// execute query");
        self.line(3, "$stmt->execute();");
        self.out.push('\n');
        self.line(3, "// return values from database");
        self.line(3, "return $stmt;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn count(&mut self) {
        let name = self.name();
        self.comment(MethodComment::new(
            format!("Retrieves the total number of records in {} view.", name),
            format!(
                "Prepares and executes a simple Select statement retrieving the count for all rows in the {} view.",
                name
            ),
            "int",
        ));
        self.line(2, "//Retrieves total number of rows in table");
        self.line(2, "public function count(): int");
        self.line(2, "{");
        self.line(
            3,
            "$query = \"SELECT COUNT(*) as count FROM \" . $this->table_name;",
        );
        self.prepare_and_execute();
        self.line(3, "$row = $stmt->fetch(PDO::FETCH_ASSOC);");
        self.line(3, "return $row['count'];");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn check_if_exists(&mut self) {
        let name = self.name();
        self.comment(MethodComment::new(
            format!("Checks if an {} object exists in the database.", name),
            format!(
                "Prepares and executes a simple Select count statement to see if there are {} records with the same fields.",
                name
            ),
            "bool",
        ));
        self.line(2, "public function checkIfExists() : bool");
        self.line(2, "{");
        self.line(3, "$query = \"SELECT COUNT(*) as count");
        self.line(4, "FROM \" . $this->table_name . \"");
        self.match_all_fields();
        self.out.push('\n');
        self.line(3, "//prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        let fields = &self.definition().fields;
        self.bind_fields(fields.iter().map(|field| field.as_str()));
        self.line(3, "$stmt->execute();");
        self.line(3, "$row = $stmt->fetch(PDO::FETCH_ASSOC);");
        self.line(3, "return $row['count'] > 0;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn get_if_exists(&mut self) {
        let name = self.name();
        self.comment(MethodComment::new(
            format!(
                "Checks if an {} object exists in the database using currently set properties.",
                name
            ),
            format!(
                "Prepares and executes a simple Select statement that retrieves an {} object from the database with currently set properties.",
                name
            ),
            "bool",
        ));
        self.line(2, "public function getIfExists() : bool");
        self.line(2, "{");
        self.line(3, "$query = \"SELECT *");
        self.line(4, "FROM \" . $this->table_name . \"");
        self.match_all_fields();
        self.out.push('\n');
        self.line(3, "//prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        let fields = &self.definition().fields;
        self.bind_fields(fields.iter().map(|field| field.as_str()));
        self.line(3, "$stmt->execute();");
        self.line(3, "$row = $stmt->fetch(PDO::FETCH_ASSOC);");
        self.line(3, "if($row === false)");
        self.line(3, "{");
        self.line(4, "return false;");
        self.line(3, "}");
        self.set_properties_from_row();
        self.line(3, "return true;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn insert(&mut self) {
        let name = self.name();
        let key = self.key();
        self.comment(MethodComment::new(
            format!("Inserts a record into the {} table.", name),
            format!(
                "Inserts a record into the {} table using currently set properties in {} object. If successful returns true.",
                name, name
            ),
            "bool",
        ));
        let value_fields: Vec<&str> = self.definition().value_fields().collect();
        self.line(2, "public function insert(): bool");
        self.line(2, "{");
        self.line(3, "$query = \"INSERT INTO");
        self.line(3, "\" . $this->table_name . \"");
        self.line(3, "SET");
        // Two assignments per line.
        let assignments: Vec<String> = value_fields
            .iter()
            .map(|field| format!("{}=:{}", field, field))
            .collect();
        let chunks: Vec<&[String]> = assignments.chunks(2).collect();
        for (index, chunk) in chunks.iter().enumerate() {
            let end = if index + 1 == chunks.len() { "\";" } else { "," };
            self.line(4, &format!("{}{}", chunk.join(", "), end));
        }
        self.out.push('\n');
        self.line(3, "//prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.out.push('\n');
        self.sanitize_fields(value_fields.iter().copied());
        self.out.push('\n');
        self.line(3, "//Bind parameters");
        self.bind_fields(value_fields.iter().copied());
        self.line(3, "if($stmt->execute())");
        self.line(3, "{");
        self.line(4, &format!("$this->{} = $this->conn->lastInsertId();", key));
        self.line(4, "return true;");
        self.line(3, "}");
        self.line(3, "return false;");
        self.line(2, "}");
        self.out.push('\n');
    }

    fn update(&mut self) {
        let name = self.name();
        let key = self.key();
        self.comment(
            MethodComment::new(
                format!(
                    "Updates a record in the {} table using currently set properties in {} object.",
                    name, name
                ),
                format!(
                    "Updates a record in the {} table using currently set properties in {} object for a given id. If successful returns true.",
                    name, name
                ),
                "bool",
            )
            .with_param("int", &format!("${} Integer for ID to update", key)),
        );
        let value_fields: Vec<&str> = self.definition().value_fields().collect();
        self.line(2, &format!("public function update(${}): bool", key));
        self.line(2, "{");
        self.line(3, &format!("$this->{} = ${};", key, key));
        self.line(3, "$query = \"UPDATE \" . $this->table_name . \"");
        let last = value_fields.len().saturating_sub(1);
        for (index, field) in value_fields.iter().enumerate() {
            let keyword = if index == 0 { "SET " } else { "" };
            let end = if index == last { "" } else { "," };
            self.line(4, &format!("{}{}=:{}{}", keyword, field, field, end));
        }
        self.line(4, &format!("WHERE {} = :{}\";", key, key));
        self.line(3, "//Prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.out.push('\n');
        self.sanitize_fields(value_fields.iter().copied());
        self.out.push('\n');
        self.line(3, "//Bind parameters");
        self.bind_fields(value_fields.iter().copied().chain([key]));
        self.line(3, "//Execute Query");
        self.execute_returning_bool();
        self.line(2, "}");
        self.out.push('\n');
    }

    fn remove(&mut self) {
        let name = self.name();
        let key = self.key();
        self.comment(MethodComment::new(
            format!("Removes a record in {} by ID", name),
            format!(
                "Prepares and executes a query to delete a record in the {} table. If successful, returns true.",
                name
            ),
            "bool",
        ));
        self.line(2, "public function remove(): bool");
        self.line(2, "{");
        self.line(3, "$query = \"DELETE FROM");
        self.line(4, "\" . $this->table_name . \"");
        self.line(4, &format!("WHERE {} = ?\";", key));
        self.line(3, "//Prepare query");
        self.line(3, "$stmt = $this->conn->prepare($query);");
        self.line(
            3,
            &format!("$this->{} = htmlspecialchars(strip_tags($this->{}));", key, key),
        );
        self.out.push('\n');
        self.line(3, "//bind id of record to delete");
        self.line(3, &format!("$stmt->bindParam(1, $this->{});", key));
        self.line(3, "//Execute Query");
        self.execute_returning_bool();
        self.line(2, "}");
    }

    fn closing(&mut self) {
        self.line(1, "}");
        self.out.push_str("?>");
    }
}

/// Generates `<output_dir>/<ClassName>.php` and returns its path.
pub fn write_class_file(
    definition: &ClassDefinition,
    output_dir: &Path,
    comment_width: usize,
) -> anyhow::Result<PathBuf> {
    if definition.value_fields().next().is_none() {
        return Err(anyhow!(
            "Class {} has no properties besides {}, nothing to insert or update",
            definition.class_name,
            definition.key_field()
        ));
    }
    if !definition.has_key_field() {
        log::warn!(
            "Class {} has no {} property, generated queries will reference it anyway",
            definition.class_name,
            definition.key_field()
        );
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Creating output directory {:?}", output_dir))?;
    let output_filepath = output_dir.join(definition.output_file_name());
    let contents = PhpClassBuilder::new(definition, comment_width).render();
    fs::write(&output_filepath, contents)
        .with_context(|| format!("Writing {:?}", output_filepath))?;
    log::info!("{:?} has been created", output_filepath);
    Ok(output_filepath)
}
