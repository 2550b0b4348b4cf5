pub mod feature;

/// A record type that maps onto a single backing table.
pub trait Record {
    /// Name of the class generated for this record.
    const CLASS_NAME: &'static str;
    const TABLE_NAME: &'static str;
    /// Property names in declaration order, as they appear in the table.
    const COLUMNS: &'static [&'static str];
}
