//! Descriptions of the rows flowing between plan steps.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use planlens_error::DbError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    Date32,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "Boolean"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float64 => write!(f, "Float64"),
            Self::Utf8 => write!(f, "Utf8"),
            Self::Date32 => write!(f, "Date32"),
            Self::Timestamp => write!(f, "Timestamp"),
        }
    }
}

impl FromStr for DataType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Self::Boolean,
            "int32" | "int" => Self::Int32,
            "int64" | "bigint" => Self::Int64,
            "float64" | "double" => Self::Float64,
            "utf8" | "text" | "string" => Self::Utf8,
            "date32" | "date" => Self::Date32,
            "timestamp" => Self::Timestamp,
            other => return Err(DbError::new(format!("Unknown data type '{other}'"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.datatype)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortColumn {
    pub column: String,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn asc(column: impl Into<String>) -> Self {
        SortColumn {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        SortColumn {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{} ASC", self.column),
            SortDirection::Descending => write!(f, "{} DESC", self.column),
        }
    }
}

/// Describes the output of a plan step: the columns produced, plus what's
/// known about how rows are ordered and which columns are distinct.
///
/// Never mutated once built. Steps producing a modified stream build a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStream {
    fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort_description: Option<Vec<SortColumn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distinct_columns: Option<BTreeSet<String>>,
}

impl DataStream {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        DataStream {
            fields: fields.into_iter().collect(),
            sort_description: None,
            distinct_columns: None,
        }
    }

    pub fn with_sort_description(mut self, description: Vec<SortColumn>) -> Self {
        self.sort_description = Some(description);
        self
    }

    pub fn with_distinct_columns(mut self, columns: impl IntoIterator<Item = String>) -> Self {
        self.distinct_columns = Some(columns.into_iter().collect());
        self
    }

    /// Same columns, no ordering or distinctness.
    pub fn header_only(&self) -> Self {
        DataStream::new(self.fields.iter().cloned())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn sort_description(&self) -> Option<&[SortColumn]> {
        self.sort_description.as_deref()
    }

    pub fn distinct_columns(&self) -> Option<&BTreeSet<String>> {
        self.distinct_columns.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// If the columns (names and types, in order) are the same, ignoring sort
    /// and distinct metadata.
    pub fn has_equal_header(&self, other: &DataStream) -> bool {
        self.fields == other.fields
    }

    /// Build a stream with `column` removed.
    ///
    /// The sort description is cut at the first reference to the removed
    /// column. Distinctness can't be guaranteed once a distinct column is
    /// removed, so it's dropped in that case.
    pub fn without_column(&self, column: &str) -> Self {
        let fields = self
            .fields
            .iter()
            .filter(|f| f.name != column)
            .cloned()
            .collect();

        let sort_description = self.sort_description.as_ref().map(|desc| {
            desc.iter()
                .take_while(|s| s.column != column)
                .cloned()
                .collect()
        });

        let distinct_columns = match &self.distinct_columns {
            Some(cols) if cols.contains(column) => None,
            other => other.clone(),
        };

        DataStream {
            fields,
            sort_description,
            distinct_columns,
        }
    }

    /// Build a stream with additional columns appended.
    ///
    /// Appending columns doesn't change row order or distinctness.
    pub fn with_appended(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let mut stream = self.clone();
        stream.fields.extend(fields);
        stream
    }

    /// Display the columns as a comma separated list.
    pub fn display_header(&self) -> HeaderDisplay<'_> {
        HeaderDisplay(&self.fields)
    }
}

#[derive(Debug)]
pub struct HeaderDisplay<'a>(&'a [Field]);

impl fmt::Display for HeaderDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> DataStream {
        DataStream::new([
            Field::new("a", DataType::Int64),
            Field::new("b", DataType::Utf8),
            Field::new("c", DataType::Boolean),
        ])
    }

    #[test]
    fn equal_header_ignores_metadata() {
        let s1 = stream();
        let s2 = stream().with_sort_description(vec![SortColumn::asc("a")]);
        assert!(s1.has_equal_header(&s2));
        assert_ne!(s1, s2);
    }

    #[test]
    fn without_column_cuts_sort_description() {
        let s = stream()
            .with_sort_description(vec![SortColumn::asc("a"), SortColumn::desc("c"), SortColumn::asc("b")])
            .with_distinct_columns(["a".to_string(), "b".to_string()]);

        let out = s.without_column("c");
        assert_eq!(2, out.fields().len());
        assert_eq!(Some(&[SortColumn::asc("a")][..]), out.sort_description());
        assert_eq!(2, out.distinct_columns().unwrap().len());

        let out = s.without_column("a");
        assert_eq!(Some(&[][..]), out.sort_description());
        assert_eq!(None, out.distinct_columns());
    }

    #[test]
    fn display_header() {
        assert_eq!("a Int64, b Utf8, c Boolean", stream().display_header().to_string());
        assert_eq!("", DataStream::new([]).display_header().to_string());
    }

    #[test]
    fn parse_datatype() {
        assert_eq!(DataType::Int64, "BIGINT".parse().unwrap());
        assert_eq!(DataType::Utf8, "utf8".parse().unwrap());
        "blob".parse::<DataType>().unwrap_err();
    }

    #[test]
    fn lookup() {
        let s = stream();
        assert_eq!(Some(1), s.field_index("b"));
        assert_eq!(Some(DataType::Boolean), s.field("c").map(|f| f.datatype));
        assert_eq!(None, s.field("d"));
    }
}
