//! Classification vocabulary: the supported DBMSs, SQLancer test oracles,
//! and issue statuses.
//!
//! The wire strings are fixed; the classifier's JSON schema, the database
//! CHECK constraints, and the enumeration endpoints all derive from the
//! `variants()` lists below.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A DBMS supported by SQLancer, or `N/A` when an issue is unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dbms {
    Citus,
    ClickHouse,
    CnosDB,
    CockroachDB,
    Databend,
    DataFusion,
    Doris,
    DuckDB,
    H2,
    #[serde(rename = "HSQLDB")]
    Hsqldb,
    MariaDB,
    Materialize,
    #[serde(rename = "MySQL")]
    MySql,
    OceanBase,
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    Presto,
    QuestDB,
    SQLite3,
    TiDB,
    YugabyteDB,
    // Previously supported DBMSs still present in older issues
    ArangoDB,
    Cosmos,
    MongoDB,
    StarRocks,
    StoneDB,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Dbms {
    /// The value stored for issues that are not about any supported DBMS.
    pub const NOT_APPLICABLE: &'static str = "N/A";

    /// All wire values, in the order presented to the frontend.
    pub fn variants() -> &'static [&'static str] {
        &[
            "Citus",
            "ClickHouse",
            "CnosDB",
            "CockroachDB",
            "Databend",
            "DataFusion",
            "Doris",
            "DuckDB",
            "H2",
            "HSQLDB",
            "MariaDB",
            "Materialize",
            "MySQL",
            "OceanBase",
            "PostgreSQL",
            "Presto",
            "QuestDB",
            "SQLite3",
            "TiDB",
            "YugabyteDB",
            "ArangoDB",
            "Cosmos",
            "MongoDB",
            "StarRocks",
            "StoneDB",
            "N/A",
        ]
    }

    /// Whether `value` is one of the known wire strings.
    pub fn is_valid(value: &str) -> bool {
        Self::variants().contains(&value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dbms::Citus => "Citus",
            Dbms::ClickHouse => "ClickHouse",
            Dbms::CnosDB => "CnosDB",
            Dbms::CockroachDB => "CockroachDB",
            Dbms::Databend => "Databend",
            Dbms::DataFusion => "DataFusion",
            Dbms::Doris => "Doris",
            Dbms::DuckDB => "DuckDB",
            Dbms::H2 => "H2",
            Dbms::Hsqldb => "HSQLDB",
            Dbms::MariaDB => "MariaDB",
            Dbms::Materialize => "Materialize",
            Dbms::MySql => "MySQL",
            Dbms::OceanBase => "OceanBase",
            Dbms::PostgreSql => "PostgreSQL",
            Dbms::Presto => "Presto",
            Dbms::QuestDB => "QuestDB",
            Dbms::SQLite3 => "SQLite3",
            Dbms::TiDB => "TiDB",
            Dbms::YugabyteDB => "YugabyteDB",
            Dbms::ArangoDB => "ArangoDB",
            Dbms::Cosmos => "Cosmos",
            Dbms::MongoDB => "MongoDB",
            Dbms::StarRocks => "StarRocks",
            Dbms::StoneDB => "StoneDB",
            Dbms::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Dbms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The SQLancer test oracle that surfaced a bug.
///
/// Oracle names follow the upstream bug list
/// (<https://github.com/sqlancer/bugs>).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOracle {
    #[serde(rename = "PQS")]
    Pqs,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "crash")]
    Crash,
    #[serde(rename = "NoREC")]
    NoRec,
    #[serde(rename = "hang")]
    Hang,
    #[serde(rename = "TLP (aggregate)")]
    TlpAggregate,
    #[serde(rename = "TLP (HAVING)")]
    TlpHaving,
    #[serde(rename = "TLP (WHERE)")]
    TlpWhere,
    #[serde(rename = "TLP (GROUP BY)")]
    TlpGroupBy,
    #[serde(rename = "TLP (DISTINCT)")]
    TlpDistinct,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl TestOracle {
    /// The value stored for issues that no oracle applies to.
    pub const NOT_APPLICABLE: &'static str = "N/A";

    /// All wire values.
    pub fn variants() -> &'static [&'static str] {
        &[
            "PQS",
            "error",
            "crash",
            "NoREC",
            "hang",
            "TLP (aggregate)",
            "TLP (HAVING)",
            "TLP (WHERE)",
            "TLP (GROUP BY)",
            "TLP (DISTINCT)",
            "N/A",
        ]
    }

    /// Whether `value` is one of the known wire strings.
    pub fn is_valid(value: &str) -> bool {
        Self::variants().contains(&value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestOracle::Pqs => "PQS",
            TestOracle::Error => "error",
            TestOracle::Crash => "crash",
            TestOracle::NoRec => "NoREC",
            TestOracle::Hang => "hang",
            TestOracle::TlpAggregate => "TLP (aggregate)",
            TestOracle::TlpHaving => "TLP (HAVING)",
            TestOracle::TlpWhere => "TLP (WHERE)",
            TestOracle::TlpGroupBy => "TLP (GROUP BY)",
            TestOracle::TlpDistinct => "TLP (DISTINCT)",
            TestOracle::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for TestOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review status of a tracked issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    Fixed,
    Closed,
    #[serde(rename = "Not a bug")]
    NotABug,
}

impl IssueStatus {
    /// The status excluded from bug counts in summaries.
    pub const NOT_A_BUG: &'static str = "Not a bug";

    /// All wire values.
    pub fn variants() -> &'static [&'static str] {
        &["Open", "Fixed", "Closed", "Not a bug"]
    }

    /// Whether `value` is one of the known wire strings.
    pub fn is_valid(value: &str) -> bool {
        Self::variants().contains(&value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::Fixed => "Fixed",
            IssueStatus::Closed => "Closed",
            IssueStatus::NotABug => "Not a bug",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
