/*!
 * Grouped statistics over stored observations.
 *
 * An `AggregateSpec` is assembled from closed enumerations and compiled to a
 * single SQL query. Nothing is cached: every call re-reads the store, so the
 * result always reflects its current contents and an empty table yields an
 * empty result.
 */

use anyhow::{anyhow, Result};
use rusqlite::{Connection, Row};

/// Tables that can be aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactTable {
    /// Current weather, one row per city
    Weather,
    /// Every distinct weather observation
    WeatherHistory,
    /// Current air quality, one row per city
    AirQuality,
    /// Every distinct air-quality observation
    AirQualityHistory,
    /// Stored news articles
    Articles,
}

impl FactTable {
    const fn table(&self) -> &'static str {
        match self {
            FactTable::Weather => "weather",
            FactTable::WeatherHistory => "weather_history",
            FactTable::AirQuality => "air_quality",
            FactTable::AirQualityHistory => "air_quality_history",
            FactTable::Articles => "articles",
        }
    }

    fn has_column(&self, column: Column) -> bool {
        match self {
            FactTable::Weather | FactTable::WeatherHistory => matches!(
                column,
                Column::Temperature | Column::Humidity | Column::WindSpeed
            ),
            FactTable::AirQuality | FactTable::AirQualityHistory => matches!(
                column,
                Column::Aqi
                    | Column::Pm2_5
                    | Column::Pm10
                    | Column::Co
                    | Column::No2
                    | Column::O3
                    | Column::So2
            ),
            FactTable::Articles => false,
        }
    }
}

/// Measurement columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Temperature,
    Humidity,
    WindSpeed,
    Aqi,
    Pm2_5,
    Pm10,
    Co,
    No2,
    O3,
    So2,
}

impl Column {
    const fn name(&self) -> &'static str {
        match self {
            Column::Temperature => "temperature",
            Column::Humidity => "humidity",
            Column::WindSpeed => "wind_speed",
            Column::Aqi => "aqi",
            Column::Pm2_5 => "pm2_5",
            Column::Pm10 => "pm10",
            Column::Co => "co",
            Column::No2 => "no2",
            Column::O3 => "o3",
            Column::So2 => "so2",
        }
    }

    const fn is_integer(&self) -> bool {
        matches!(self, Column::Humidity | Column::Aqi)
    }

    /// Categorical columns are reported, never averaged
    pub const fn is_categorical(&self) -> bool {
        matches!(self, Column::Aqi)
    }
}

/// Grouping applied to the fact table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// One group per city
    City,
    /// One group per (country name, day of week 0=Sunday..6)
    CountryAndWeekday,
}

/// A statistic computed per group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Arithmetic mean of a numeric column
    Mean(Column),
    /// Number of rows in the group
    Count,
    /// Value from the most recently stored row of the group
    Latest(Column),
}

/// A metric result for one group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Real(Option<f64>),
    Integer(Option<i64>),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            MetricValue::Real(v) => v,
            MetricValue::Integer(v) => v.map(|i| i as f64),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MetricValue::Integer(v) => v,
            MetricValue::Real(_) => None,
        }
    }
}

/// One output row: the group key parts followed by one value per metric
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub group: Vec<String>,
    pub values: Vec<MetricValue>,
}

/// What to aggregate and how
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub table: FactTable,
    pub group_by: GroupKey,
    pub metrics: Vec<Metric>,
}

impl AggregateSpec {
    pub fn new(table: FactTable, group_by: GroupKey, metrics: Vec<Metric>) -> Self {
        Self {
            table,
            group_by,
            metrics,
        }
    }

    fn validate(&self) -> Result<()> {
        match (self.table, self.group_by) {
            (FactTable::Articles, GroupKey::City) => {
                return Err(anyhow!("articles cannot be grouped by city"));
            }
            (FactTable::Articles, GroupKey::CountryAndWeekday) => {}
            (_, GroupKey::CountryAndWeekday) => {
                return Err(anyhow!("{} cannot be grouped by country and weekday", self.table.table()));
            }
            _ => {}
        }

        for metric in &self.metrics {
            match *metric {
                Metric::Count => {}
                Metric::Mean(column) => {
                    self.check_column(column)?;
                    if column.is_categorical() {
                        return Err(anyhow!("{} is categorical and cannot be averaged", column.name()));
                    }
                }
                Metric::Latest(column) => {
                    self.check_column(column)?;
                    if self.group_by != GroupKey::City {
                        return Err(anyhow!("latest value is only defined per city"));
                    }
                }
            }
        }

        Ok(())
    }

    fn check_column(&self, column: Column) -> Result<()> {
        if self.table.has_column(column) {
            Ok(())
        } else {
            Err(anyhow!("{} has no column {}", self.table.table(), column.name()))
        }
    }

    fn metric_sql(&self, metric: Metric) -> String {
        let table = self.table.table();
        match metric {
            Metric::Mean(column) => format!("AVG(t.{})", column.name()),
            Metric::Count => "COUNT(t.id)".to_string(),
            Metric::Latest(column) => format!(
                "(SELECT x.{col} FROM {table} x WHERE x.city = t.city ORDER BY x.timestamp DESC, x.id DESC LIMIT 1)",
                col = column.name(),
                table = table,
            ),
        }
    }

    fn to_sql(&self) -> String {
        let metrics: Vec<String> = self.metrics.iter().map(|m| self.metric_sql(*m)).collect();
        let metrics = if metrics.is_empty() {
            String::new()
        } else {
            format!(", {}", metrics.join(", "))
        };

        match self.group_by {
            GroupKey::City => format!(
                "SELECT t.city{metrics} FROM {table} t GROUP BY t.city ORDER BY t.city",
                metrics = metrics,
                table = self.table.table(),
            ),
            GroupKey::CountryAndWeekday => format!(
                r#"SELECT c.name, strftime('%w', t.published_date) AS day_of_week{metrics}
                FROM articles t
                JOIN countries c ON t.country_id = c.id
                JOIN sources s ON t.source_id = s.id
                WHERE strftime('%w', t.published_date) IS NOT NULL
                GROUP BY c.name, day_of_week
                ORDER BY c.name, day_of_week"#,
                metrics = metrics,
            ),
        }
    }

    fn group_width(&self) -> usize {
        match self.group_by {
            GroupKey::City => 1,
            GroupKey::CountryAndWeekday => 2,
        }
    }

    fn read_row(&self, row: &Row) -> rusqlite::Result<AggregateRow> {
        let width = self.group_width();
        let mut group = Vec::with_capacity(width);
        for idx in 0..width {
            group.push(row.get::<_, String>(idx)?);
        }

        let mut values = Vec::with_capacity(self.metrics.len());
        for (offset, metric) in self.metrics.iter().enumerate() {
            let idx = width + offset;
            let value = match metric {
                Metric::Count => MetricValue::Integer(row.get(idx)?),
                Metric::Mean(_) => MetricValue::Real(row.get(idx)?),
                Metric::Latest(column) if column.is_integer() => MetricValue::Integer(row.get(idx)?),
                Metric::Latest(_) => MetricValue::Real(row.get(idx)?),
            };
            values.push(value);
        }

        Ok(AggregateRow { group, values })
    }
}

/// Run an aggregation against the store's current contents
pub fn aggregate(conn: &Connection, spec: &AggregateSpec) -> Result<Vec<AggregateRow>> {
    spec.validate()?;

    let mut stmt = conn.prepare(&spec.to_sql())?;
    let rows = stmt
        .query_map([], |row| spec.read_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Average temperature and humidity for a city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherAverage {
    pub city: String,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
}

/// Average PM2.5 and the most recent AQI category for a city
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualitySummary {
    pub city: String,
    pub avg_pm2_5: Option<f64>,
    pub aqi: Option<i64>,
}

/// Number of articles for a country published on a given weekday
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleTrend {
    pub country: String,
    pub article_count: i64,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
}

pub fn weather_averages_spec() -> AggregateSpec {
    AggregateSpec::new(
        FactTable::WeatherHistory,
        GroupKey::City,
        vec![Metric::Mean(Column::Temperature), Metric::Mean(Column::Humidity)],
    )
}

pub fn air_quality_summary_spec() -> AggregateSpec {
    AggregateSpec::new(
        FactTable::AirQualityHistory,
        GroupKey::City,
        vec![Metric::Mean(Column::Pm2_5), Metric::Latest(Column::Aqi)],
    )
}

pub fn article_trends_spec() -> AggregateSpec {
    AggregateSpec::new(FactTable::Articles, GroupKey::CountryAndWeekday, vec![Metric::Count])
}

pub fn weather_averages(conn: &Connection) -> Result<Vec<WeatherAverage>> {
    let rows = aggregate(conn, &weather_averages_spec())?;
    Ok(rows
        .into_iter()
        .map(|row| WeatherAverage {
            avg_temperature: row.values[0].as_f64(),
            avg_humidity: row.values[1].as_f64(),
            city: row.group.into_iter().next().unwrap_or_default(),
        })
        .collect())
}

pub fn air_quality_summary(conn: &Connection) -> Result<Vec<AirQualitySummary>> {
    let rows = aggregate(conn, &air_quality_summary_spec())?;
    Ok(rows
        .into_iter()
        .map(|row| AirQualitySummary {
            avg_pm2_5: row.values[0].as_f64(),
            aqi: row.values[1].as_i64(),
            city: row.group.into_iter().next().unwrap_or_default(),
        })
        .collect())
}

pub fn article_trends(conn: &Connection) -> Result<Vec<ArticleTrend>> {
    let rows = aggregate(conn, &article_trends_spec())?;
    let mut trends = Vec::with_capacity(rows.len());
    for row in rows {
        let day_of_week: u8 = row.group[1]
            .parse()
            .map_err(|e| anyhow!("Unexpected weekday {:?}: {}", row.group[1], e))?;
        trends.push(ArticleTrend {
            country: row.group[0].clone(),
            article_count: row.values[0].as_i64().unwrap_or(0),
            day_of_week,
        });
    }
    Ok(trends)
}
