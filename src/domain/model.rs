use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Literal CSV header names for each role the analysis needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub region: String,
    pub customer_group: String,
    pub units: String,
    pub sales: String,
    pub time_of_day: String,
    pub date: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            region: "State".to_string(),
            customer_group: "Group".to_string(),
            units: "Unit".to_string(),
            sales: "Sales".to_string(),
            time_of_day: "Time".to_string(),
            date: "Date".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn required(&self) -> [&str; 4] {
        [
            self.region.as_str(),
            self.customer_group.as_str(),
            self.units.as_str(),
            self.sales.as_str(),
        ]
    }

    /// Columns imputed with the mean and min-max scaled.
    pub fn numeric(&self) -> [&str; 2] {
        [self.units.as_str(), self.sales.as_str()]
    }

    pub fn all(&self) -> [&str; 6] {
        [
            self.region.as_str(),
            self.customer_group.as_str(),
            self.units.as_str(),
            self.sales.as_str(),
            self.time_of_day.as_str(),
            self.date.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    pub fn null_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    pub fn number(&self, row: usize) -> Option<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.get(row).copied().flatten(),
            ColumnValues::Categorical(v) => v
                .get(row)
                .and_then(|s| s.as_deref())
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn text(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Numeric(v) => v.get(row).copied().flatten().map(|n| n.to_string()),
            ColumnValues::Categorical(v) => v.get(row).cloned().flatten(),
        }
    }
}

/// In-memory table of equally long named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl DataTable {
    pub fn new(columns: Vec<Column>) -> Option<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if columns.iter().any(|c| c.len() != row_count) {
            return None;
        }
        Some(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub region: String,
    pub customer_group: String,
    pub time_of_day: Option<String>,
    pub units: f64,
    pub sales: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTable {
    pub records: Vec<SalesRecord>,
    pub has_time_of_day: bool,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.region.as_str()) {
                seen.push(record.region.as_str());
            }
        }
        seen
    }

    pub fn distinct_customer_groups(&self) -> usize {
        let mut groups: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.customer_group.as_str())
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups.len()
    }

    pub fn sales_for_region(&self, region: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.region == region)
            .map(|r| r.sales)
            .collect()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Sum,
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub key: String,
    pub value: f64,
}

/// Sales folded per distinct key, kept in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedAggregate {
    pub kind: AggregateKind,
    pub values: Vec<GroupValue>,
}

impl GroupedAggregate {
    pub fn sum_by<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
        for (key, value) in pairs {
            *sums.entry(key).or_insert(0.0) += value;
        }
        Self {
            kind: AggregateKind::Sum,
            values: sums
                .into_iter()
                .map(|(key, value)| GroupValue {
                    key: key.to_string(),
                    value,
                })
                .collect(),
        }
    }

    pub fn mean_by<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for (key, value) in pairs {
            let entry = acc.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        Self {
            kind: AggregateKind::Mean,
            values: acc
                .into_iter()
                .map(|(key, (sum, count))| GroupValue {
                    key: key.to_string(),
                    value: sum / count as f64,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|g| g.key == key).map(|g| g.value)
    }

    pub fn total(&self) -> f64 {
        self.values.iter().map(|g| g.value).sum()
    }

    /// Descending by value; equal values keep key order.
    pub fn sorted_desc(&self) -> Vec<GroupValue> {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
        sorted
    }

    pub fn top(&self, n: usize) -> Vec<GroupValue> {
        let mut top = self.sorted_desc();
        top.truncate(n);
        top
    }

    /// Ascending by value; equal values keep key order.
    pub fn bottom(&self, n: usize) -> Vec<GroupValue> {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
        sorted.truncate(n);
        sorted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Rows in `describe()` order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQuality {
    pub name: String,
    pub null_count: usize,
    pub null_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub row_count: usize,
    pub columns: Vec<ColumnQuality>,
}

impl QualityReport {
    /// One flag per column, in table order: true when the column has nulls.
    pub fn null_mask(&self) -> Vec<bool> {
        self.columns.iter().map(|c| c.null_count > 0).collect()
    }

    pub fn columns_with_nulls(&self) -> Vec<&ColumnQuality> {
        self.columns.iter().filter(|c| c.null_count > 0).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", content = "value", rename_all = "lowercase")]
pub enum FillValue {
    Mean(f64),
    Mode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub filled: usize,
    pub fill: FillValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnScale {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub constant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedTable {
    pub table: DataTable,
    pub imputations: Vec<Imputation>,
    pub scaling: Vec<ColumnScale>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub state_wise: GroupedAggregate,
    pub group_wise: GroupedAggregate,
    pub time_wise: Option<GroupedAggregate>,
    pub unit_stats: DescriptiveStats,
    pub sales_stats: DescriptiveStats,
    pub total_sales: f64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    StateWiseSales,
    GroupSales,
    SalesDistribution,
    TimeOfDaySales,
    UnitSalesRelationship,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::StateWiseSales,
        ChartKind::GroupSales,
        ChartKind::SalesDistribution,
        ChartKind::TimeOfDaySales,
        ChartKind::UnitSalesRelationship,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::StateWiseSales => "state_wise_sales.png",
            ChartKind::GroupSales => "group_sales.png",
            ChartKind::SalesDistribution => "sales_distribution.png",
            ChartKind::TimeOfDaySales => "time_of_day_sales.png",
            ChartKind::UnitSalesRelationship => "unit_sales_relationship.png",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::StateWiseSales => "State-wise Sales Analysis",
            ChartKind::GroupSales => "Sales Distribution by Group",
            ChartKind::SalesDistribution => "Sales Distribution by State",
            ChartKind::TimeOfDaySales => "Average Sales Throughout the Day",
            ChartKind::UnitSalesRelationship => "Unit vs Sales Relationship",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartStatus {
    Written(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOutcome {
    pub chart: ChartKind,
    pub status: ChartStatus,
}

impl ChartOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ChartStatus::Written(_))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub table: DataTable,
    pub quality: QualityReport,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub quality: QualityReport,
    pub cleaned: CleanedTable,
    pub sales: SalesTable,
    pub aggregates: Aggregates,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: String,
    pub charts: Vec<ChartOutcome>,
    pub extra_outputs: Vec<String>,
}
