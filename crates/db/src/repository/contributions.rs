//! Contribution log operations.
//!
//! The table is append-only: there is no update or delete here.  Deleting a
//! contributed file on disk leaves its row in place.

use sqlx::SqlitePool;

use crate::{
    DbError,
    models::{ContributionRow, NewContribution, SizePoint},
};

/// Row columns with NULLs read as empty strings.  Tables created by earlier
/// tooling declare every text column nullable.
macro_rules! row_columns {
    () => {
        "id, COALESCE(map_name, '') AS map_name, COALESCE(contributor, '') AS contributor, \
         COALESCE(email, '') AS email, COALESCE(timestamp, '') AS timestamp, \
         COALESCE(file_path, '') AS file_path"
    };
}

/// Append a contribution row and return it with its assigned id.
pub async fn insert_contribution(
    pool: &SqlitePool,
    new: &NewContribution,
) -> Result<ContributionRow, DbError> {
    let row = sqlx::query_as::<_, ContributionRow>(concat!(
        "INSERT INTO contributions (map_name, contributor, email, timestamp, file_path) \
         VALUES (?, ?, ?, ?, ?) RETURNING ",
        row_columns!()
    ))
    .bind(&new.map_name)
    .bind(&new.contributor)
    .bind(&new.email)
    .bind(&new.timestamp)
    .bind(&new.file_path)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single contribution by its primary key.
pub async fn get_contribution(pool: &SqlitePool, id: i64) -> Result<ContributionRow, DbError> {
    let row = sqlx::query_as::<_, ContributionRow>(concat!(
        "SELECT ",
        row_columns!(),
        " FROM contributions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return every contribution in insertion order.
pub async fn list_contributions(pool: &SqlitePool) -> Result<Vec<ContributionRow>, DbError> {
    let rows = sqlx::query_as::<_, ContributionRow>(concat!(
        "SELECT ",
        row_columns!(),
        " FROM contributions ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total number of rows in the log.
pub async fn count_contributions(pool: &SqlitePool) -> Result<i64, DbError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contributions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Most recent timestamp in the log, `None` when the log is empty.
pub async fn latest_timestamp(pool: &SqlitePool) -> Result<Option<String>, DbError> {
    let (latest,): (Option<String>,) = sqlx::query_as("SELECT MAX(timestamp) FROM contributions")
        .fetch_one(pool)
        .await?;
    Ok(latest)
}

/// Stored-path length summed per timestamp, oldest first.
///
/// Map names are joined with [`crate::models::NAME_SEPARATOR`] (unit
/// separator, `char(31)`), which never occurs in a typed map name.
pub async fn size_over_time(pool: &SqlitePool) -> Result<Vec<SizePoint>, DbError> {
    let rows = sqlx::query_as::<_, SizePoint>(
        r#"
        SELECT COALESCE(timestamp, '') AS timestamp,
               COALESCE(SUM(LENGTH(file_path)), 0) AS total_size,
               COALESCE(GROUP_CONCAT(map_name, char(31)), '') AS file_names
        FROM contributions
        GROUP BY timestamp
        ORDER BY timestamp
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::connect;

    fn row(map: &str, timestamp: &str, path: &str) -> NewContribution {
        NewContribution {
            map_name: map.into(),
            contributor: "Tariro".into(),
            email: "tariro@example.com".into(),
            timestamp: timestamp.into(),
            file_path: path.into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();

        let a = insert_contribution(&pool, &row("a", "2024-01-01T00:00:00.000000Z", "x/a.tif"))
            .await
            .unwrap();
        let b = insert_contribution(&pool, &row("b", "2024-01-02T00:00:00.000000Z", "x/b.tif"))
            .await
            .unwrap();

        assert!(b.id > a.id);
        assert_eq!(get_contribution(&pool, a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        assert!(matches!(get_contribution(&pool, 42).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn duplicates_are_accepted() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        let dup = row("dam", "2024-01-01T00:00:00.000000Z", "x/dam.tif");

        insert_contribution(&pool, &dup).await.unwrap();
        insert_contribution(&pool, &dup).await.unwrap();

        assert_eq!(count_contributions(&pool).await.unwrap(), 2);
        assert_eq!(list_contributions(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_log_has_no_latest_timestamp() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        assert_eq!(count_contributions(&pool).await.unwrap(), 0);
        assert_eq!(latest_timestamp(&pool).await.unwrap(), None);
        assert!(size_over_time(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_timestamp_is_the_maximum() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        insert_contribution(&pool, &row("b", "2024-03-01T00:00:00.000000Z", "b"))
            .await
            .unwrap();
        insert_contribution(&pool, &row("a", "2024-01-01T00:00:00.000000Z", "a"))
            .await
            .unwrap();

        assert_eq!(
            latest_timestamp(&pool).await.unwrap().as_deref(),
            Some("2024-03-01T00:00:00.000000Z")
        );
    }

    #[tokio::test]
    async fn size_over_time_groups_by_timestamp() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        let t1 = "2024-01-01T00:00:00.000000Z";
        let t2 = "2024-02-01T00:00:00.000000Z";
        insert_contribution(&pool, &row("late", t2, "abc")).await.unwrap();
        insert_contribution(&pool, &row("one", t1, "abcd")).await.unwrap();
        insert_contribution(&pool, &row("two", t1, "ab")).await.unwrap();

        let points = size_over_time(&pool).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, t1);
        assert_eq!(points[0].total_size, 6);
        let mut names = points[0].names();
        names.sort();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(points[1].timestamp, t2);
        assert_eq!(points[1].total_size, 3);
    }

    #[tokio::test]
    async fn names_with_commas_survive_grouping() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        let t = "2024-01-01T00:00:00.000000Z";
        insert_contribution(&pool, &row("Dam, North", t, "a")).await.unwrap();
        insert_contribution(&pool, &row("Dam", t, "b")).await.unwrap();

        let mut names = size_over_time(&pool).await.unwrap()[0].names();
        names.sort();
        assert_eq!(names, vec!["Dam", "Dam, North"]);
    }

    #[tokio::test]
    async fn legacy_rows_with_nulls_still_list() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        sqlx::query("INSERT INTO contributions (map_name) VALUES ('legacy.tif')")
            .execute(&pool)
            .await
            .unwrap();

        let rows = list_contributions(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].map_name, "legacy.tif");
        assert_eq!(rows[0].email, "");
        assert_eq!(rows[0].timestamp, "");
        assert_eq!(size_over_time(&pool).await.unwrap()[0].total_size, 0);
    }
}
