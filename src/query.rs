//! Query construction.
//!
//! Renders the SQL statement submitted to the engine from a validated
//! [`QueryConfig`]. Column list and table name are interpolated verbatim,
//! with no escaping; the input is trusted to the same degree the service's
//! own consoles trust it.

use crate::config::QueryConfig;

/// Builds the SQL statement for the given configuration.
///
/// Template: `select {columns} from {table}`, then an optional
/// `TD_TIME_RANGE` predicate over the `time` column (emitting `null` for
/// an unset bound), then an optional `limit` clause. Pure and
/// deterministic: the same configuration always yields the same string.
pub fn build_query(config: &QueryConfig) -> String {
    let mut query = format!("select {} from {}", config.columns, config.table);

    match (config.min_time, config.max_time) {
        (Some(min), None) => {
            query.push_str(&format!(" where TD_TIME_RANGE(time,{min}, null)"));
        }
        (None, Some(max)) => {
            query.push_str(&format!(" where TD_TIME_RANGE(time,null, {max})"));
        }
        (Some(min), Some(max)) => {
            query.push_str(&format!(" where TD_TIME_RANGE(time,{min},{max})"));
        }
        (None, None) => {}
    }

    if let Some(limit) = config.limit {
        query.push_str(&format!(" limit {limit} "));
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Engine, OutputFormat};
    use pretty_assertions::assert_eq;

    fn config() -> QueryConfig {
        QueryConfig {
            format: OutputFormat::Tabular,
            columns: "*".to_string(),
            limit: None,
            min_time: None,
            max_time: None,
            engine: Engine::Presto,
            database: "mydb".to_string(),
            table: "events".to_string(),
        }
    }

    #[test]
    fn test_no_bounds_no_limit() {
        assert_eq!(build_query(&config()), "select * from events");
    }

    #[test]
    fn test_both_bounds() {
        let config = QueryConfig {
            min_time: Some(100),
            max_time: Some(200),
            ..config()
        };
        assert_eq!(
            build_query(&config),
            "select * from events where TD_TIME_RANGE(time,100,200)"
        );
    }

    #[test]
    fn test_min_only() {
        let config = QueryConfig {
            min_time: Some(100),
            ..config()
        };
        assert_eq!(
            build_query(&config),
            "select * from events where TD_TIME_RANGE(time,100, null)"
        );
    }

    #[test]
    fn test_max_only() {
        let config = QueryConfig {
            max_time: Some(200),
            ..config()
        };
        assert_eq!(
            build_query(&config),
            "select * from events where TD_TIME_RANGE(time,null, 200)"
        );
    }

    #[test]
    fn test_limit_appended() {
        let config = QueryConfig {
            limit: Some(10),
            ..config()
        };
        assert_eq!(build_query(&config), "select * from events limit 10 ");
    }

    #[test]
    fn test_columns_and_everything() {
        let config = QueryConfig {
            columns: "id,name".to_string(),
            min_time: Some(-100),
            max_time: Some(0),
            limit: Some(5),
            ..config()
        };
        assert_eq!(
            build_query(&config),
            "select id,name from events where TD_TIME_RANGE(time,-100,0) limit 5 "
        );
    }

    #[test]
    fn test_deterministic() {
        let config = QueryConfig {
            min_time: Some(100),
            max_time: Some(200),
            limit: Some(10),
            ..config()
        };
        assert_eq!(build_query(&config), build_query(&config));
    }
}
