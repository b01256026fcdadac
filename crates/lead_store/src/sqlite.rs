//! SQLite lead store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{Comment, Lead, LeadPriority, LeadSource, LeadStatus, SalesAgent, Tag};
use sqlx::{
    sqlite::{SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use uuid::Uuid;

use crate::{
    traits::{sort_agents, sort_thread},
    LeadFilter, LeadStore, LeadStoreError, LeadStoreResult,
};

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS sales_agents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leads (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        source TEXT NOT NULL,
        sales_agent_ids TEXT NOT NULL,
        status TEXT NOT NULL,
        tags TEXT NOT NULL,
        time_to_close INTEGER NOT NULL,
        priority TEXT NOT NULL,
        closed_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        lead_id TEXT NOT NULL,
        author_id TEXT NOT NULL,
        comment_text TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_comments_lead_id
    ON comments (lead_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
];

/// SQLite-backed lead store.
///
/// Agent and tag lists on a lead are stored as JSON text columns.
#[derive(Debug, Clone)]
pub struct SqliteLeadStore {
    pool: Pool<Sqlite>,
}

impl SqliteLeadStore {
    /// Connects to `database_url` and creates missing tables.
    pub async fn connect(database_url: &str) -> LeadStoreResult<Self> {
        // Every connection to `sqlite::memory:` gets its own database, so the
        // pool must hold exactly one connection that never expires.
        let in_memory = database_url.contains(":memory:");
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options.connect(database_url).await?;
        let store = Self { pool };
        store.init().await?;

        tracing::info!(in_memory, "SQLite lead store ready");
        Ok(store)
    }

    /// Creates the tables if they do not exist.
    pub async fn init(&self) -> LeadStoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

}

fn time_to_close_column(lead: &Lead) -> LeadStoreResult<i64> {
    i64::try_from(lead.time_to_close)
        .map_err(|_| LeadStoreError::out_of_range("leads.time_to_close", lead.time_to_close))
}

fn parse_uuid(column: &'static str, value: &str) -> LeadStoreResult<Uuid> {
    Uuid::from_str(value).map_err(|_| LeadStoreError::corrupt(column, value))
}

fn agent_from_row(row: &SqliteRow) -> LeadStoreResult<SalesAgent> {
    let id: String = row.try_get("id")?;
    Ok(SalesAgent {
        id: parse_uuid("sales_agents.id", &id)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn lead_from_row(row: &SqliteRow) -> LeadStoreResult<Lead> {
    let id: String = row.try_get("id")?;
    let source: String = row.try_get("source")?;
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let agent_ids: String = row.try_get("sales_agent_ids")?;
    let tags: String = row.try_get("tags")?;
    let time_to_close: i64 = row.try_get("time_to_close")?;

    let sales_agent_ids = serde_json::from_str::<Vec<String>>(&agent_ids)?
        .iter()
        .map(|id| parse_uuid("leads.sales_agent_ids", id))
        .collect::<LeadStoreResult<Vec<_>>>()?;

    Ok(Lead {
        id: parse_uuid("leads.id", &id)?,
        name: row.try_get("name")?,
        source: LeadSource::parse(&source)
            .ok_or_else(|| LeadStoreError::corrupt("leads.source", source.clone()))?,
        sales_agent_ids,
        status: LeadStatus::parse(&status)
            .ok_or_else(|| LeadStoreError::corrupt("leads.status", status.clone()))?,
        tags: serde_json::from_str(&tags)?,
        time_to_close: u64::try_from(time_to_close)
            .map_err(|_| LeadStoreError::corrupt("leads.time_to_close", time_to_close.to_string()))?,
        priority: LeadPriority::parse(&priority)
            .ok_or_else(|| LeadStoreError::corrupt("leads.priority", priority.clone()))?,
        closed_at: row.try_get::<Option<DateTime<Utc>>, _>("closed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> LeadStoreResult<Comment> {
    let id: String = row.try_get("id")?;
    let lead_id: String = row.try_get("lead_id")?;
    let author_id: String = row.try_get("author_id")?;
    Ok(Comment {
        id: parse_uuid("comments.id", &id)?,
        lead_id: parse_uuid("comments.lead_id", &lead_id)?,
        author_id: parse_uuid("comments.author_id", &author_id)?,
        text: row.try_get("comment_text")?,
        created_at: row.try_get("created_at")?,
    })
}

fn tag_from_row(row: &SqliteRow) -> LeadStoreResult<Tag> {
    let id: String = row.try_get("id")?;
    Ok(Tag {
        id: parse_uuid("tags.id", &id)?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn agent_ids_json(lead: &Lead) -> LeadStoreResult<String> {
    let ids: Vec<String> = lead.sales_agent_ids.iter().map(Uuid::to_string).collect();
    Ok(serde_json::to_string(&ids)?)
}

/// Maps a unique-constraint violation to [`LeadStoreError::AlreadyExists`].
fn map_unique(err: sqlx::Error, entity_type: &'static str, id: &str) -> LeadStoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            LeadStoreError::already_exists(entity_type, id)
        }
        _ => LeadStoreError::Database(err),
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    // =========================================================================
    // Sales agent operations
    // =========================================================================

    async fn create_sales_agent(&self, agent: SalesAgent) -> LeadStoreResult<SalesAgent> {
        sqlx::query(
            r#"
            INSERT INTO sales_agents (id, name, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(agent.id.to_string())
        .bind(&agent.name)
        .bind(&agent.email)
        .bind(agent.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "SalesAgent", &agent.email))?;
        Ok(agent)
    }

    async fn get_sales_agent(&self, id: Uuid) -> LeadStoreResult<Option<SalesAgent>> {
        let row = sqlx::query("SELECT * FROM sales_agents WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(agent_from_row).transpose()
    }

    async fn get_sales_agent_by_email(&self, email: &str) -> LeadStoreResult<Option<SalesAgent>> {
        let row = sqlx::query("SELECT * FROM sales_agents WHERE email = ?1 COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(agent_from_row).transpose()
    }

    async fn list_sales_agents(&self) -> LeadStoreResult<Vec<SalesAgent>> {
        let rows = sqlx::query("SELECT * FROM sales_agents")
            .fetch_all(&self.pool)
            .await?;
        let mut agents = rows
            .iter()
            .map(agent_from_row)
            .collect::<LeadStoreResult<Vec<_>>>()?;
        sort_agents(&mut agents);
        Ok(agents)
    }

    async fn delete_sales_agent(&self, id: Uuid) -> LeadStoreResult<()> {
        let result = sqlx::query("DELETE FROM sales_agents WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LeadStoreError::not_found("SalesAgent", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Lead operations
    // =========================================================================

    async fn create_lead(&self, lead: Lead) -> LeadStoreResult<Lead> {
        sqlx::query(
            r#"
            INSERT INTO leads (
                id, name, source, sales_agent_ids, status, tags,
                time_to_close, priority, closed_at, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(lead.id.to_string())
        .bind(&lead.name)
        .bind(lead.source.as_str())
        .bind(agent_ids_json(&lead)?)
        .bind(lead.status.as_str())
        .bind(serde_json::to_string(&lead.tags)?)
        .bind(time_to_close_column(&lead)?)
        .bind(lead.priority.as_str())
        .bind(lead.closed_at)
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Lead", &lead.id.to_string()))?;
        Ok(lead)
    }

    async fn get_lead(&self, id: Uuid) -> LeadStoreResult<Option<Lead>> {
        let row = sqlx::query("SELECT * FROM leads WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(lead_from_row).transpose()
    }

    async fn list_leads(&self, filter: LeadFilter) -> LeadStoreResult<Vec<Lead>> {
        // Status and source narrow in SQL; the JSON list predicates run on the
        // decoded rows.
        let rows = sqlx::query(
            r#"
            SELECT * FROM leads
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR source = ?2)
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.source.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in &rows {
            let lead = lead_from_row(row)?;
            if filter.matches(&lead) {
                leads.push(lead);
            }
        }
        filter.sort(&mut leads);
        Ok(leads)
    }

    async fn update_lead(&self, lead: Lead) -> LeadStoreResult<Lead> {
        let result = sqlx::query(
            r#"
            UPDATE leads SET
                name = ?2,
                source = ?3,
                sales_agent_ids = ?4,
                status = ?5,
                tags = ?6,
                time_to_close = ?7,
                priority = ?8,
                closed_at = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(lead.id.to_string())
        .bind(&lead.name)
        .bind(lead.source.as_str())
        .bind(agent_ids_json(&lead)?)
        .bind(lead.status.as_str())
        .bind(serde_json::to_string(&lead.tags)?)
        .bind(time_to_close_column(&lead)?)
        .bind(lead.priority.as_str())
        .bind(lead.closed_at)
        .bind(lead.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeadStoreError::not_found("Lead", lead.id.to_string()));
        }
        Ok(lead)
    }

    async fn delete_lead(&self, id: Uuid) -> LeadStoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM leads WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LeadStoreError::not_found("Lead", id.to_string()));
        }

        sqlx::query("DELETE FROM comments WHERE lead_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Comment operations
    // =========================================================================

    async fn create_comment(&self, comment: Comment) -> LeadStoreResult<Comment> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, lead_id, author_id, comment_text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(comment.id.to_string())
        .bind(comment.lead_id.to_string())
        .bind(comment.author_id.to_string())
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Comment", &comment.id.to_string()))?;
        Ok(comment)
    }

    async fn list_comments(&self, lead_id: Uuid) -> LeadStoreResult<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE lead_id = ?1 ORDER BY rowid")
            .bind(lead_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        let mut comments = rows
            .iter()
            .map(comment_from_row)
            .collect::<LeadStoreResult<Vec<_>>>()?;
        sort_thread(&mut comments);
        Ok(comments)
    }

    // =========================================================================
    // Tag operations
    // =========================================================================

    async fn create_tag(&self, tag: Tag) -> LeadStoreResult<Tag> {
        sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(tag.id.to_string())
            .bind(&tag.name)
            .bind(tag.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, "Tag", &tag.name))?;
        Ok(tag)
    }

    async fn list_tags(&self) -> LeadStoreResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(tag_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use entities::LeadFields;

    use super::*;

    async fn memory_store() -> SqliteLeadStore {
        SqliteLeadStore::connect("sqlite::memory:").await.unwrap()
    }

    fn fields_for(agents: Vec<Uuid>, status: LeadStatus, tags: &[&str]) -> LeadFields {
        LeadFields {
            name: "Globex".to_string(),
            source: LeadSource::ColdCall,
            sales_agent_ids: agents,
            status,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            time_to_close: 30,
            priority: LeadPriority::Low,
        }
    }

    fn lead_for(agents: Vec<Uuid>, status: LeadStatus, tags: &[&str]) -> Lead {
        Lead::new(fields_for(agents, status, tags))
    }

    #[tokio::test]
    async fn test_sales_agent_roundtrip_and_unique_email() {
        let store = memory_store().await;

        let agent = SalesAgent::new("Alice", "alice@example.com");
        store.create_sales_agent(agent.clone()).await.unwrap();

        let fetched = store.get_sales_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.created_at, agent.created_at);

        let by_email = store
            .get_sales_agent_by_email("Alice@Example.com")
            .await
            .unwrap();
        assert!(by_email.is_some());

        let duplicate = store
            .create_sales_agent(SalesAgent::new("Imposter", "ALICE@example.com"))
            .await;
        assert!(matches!(
            duplicate,
            Err(LeadStoreError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_lead_roundtrip_preserves_fields() {
        let store = memory_store().await;
        let agents = vec![Uuid::new_v4(), Uuid::new_v4()];

        let lead = Lead::new_at(
            LeadFields {
                name: "Initech".to_string(),
                source: LeadSource::ColdCall,
                sales_agent_ids: agents.clone(),
                status: LeadStatus::Closed,
                tags: vec!["enterprise".to_string(), "hot".to_string()],
                time_to_close: 5_000_000_000,
                priority: LeadPriority::High,
            },
            Utc::now(),
        );
        store.create_lead(lead.clone()).await.unwrap();

        let fetched = store.get_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(fetched, lead);
        assert_eq!(fetched.sales_agent_ids, agents);
    }

    #[tokio::test]
    async fn test_list_leads_filters() {
        let store = memory_store().await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let tagged = lead_for(vec![alice], LeadStatus::New, &["a", "b"]);
        let half = lead_for(vec![alice, bob], LeadStatus::New, &["a"]);
        let closed = lead_for(vec![bob], LeadStatus::Closed, &["a", "b"]);
        for lead in [&tagged, &half, &closed] {
            store.create_lead(lead.clone()).await.unwrap();
        }

        let both_tags = store
            .list_leads(LeadFilter::new().with_tags(["a".to_string(), "b".to_string()]))
            .await
            .unwrap();
        assert_eq!(both_tags.len(), 2);

        let open_for_bob = store
            .list_leads(
                LeadFilter::new()
                    .with_sales_agents([bob])
                    .with_status(LeadStatus::New),
            )
            .await
            .unwrap();
        assert_eq!(open_for_bob.len(), 1);
        assert_eq!(open_for_bob[0].id, half.id);

        let by_source = store
            .list_leads(LeadFilter::new().with_source(LeadSource::Email))
            .await
            .unwrap();
        assert!(by_source.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_lead() {
        let store = memory_store().await;
        let agent = Uuid::new_v4();
        let mut lead = store
            .create_lead(lead_for(vec![agent], LeadStatus::New, &[]))
            .await
            .unwrap();

        let now = Utc::now();
        lead.apply_changes(fields_for(vec![agent], LeadStatus::Closed, &[]), now);
        store.update_lead(lead.clone()).await.unwrap();

        let fetched = store.get_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, LeadStatus::Closed);
        assert_eq!(fetched.closed_at, Some(now));

        let mut comment = Comment::new(lead.id, agent, "closing call went well");
        comment.created_at = now - Duration::minutes(1);
        store.create_comment(comment).await.unwrap();

        store.delete_lead(lead.id).await.unwrap();
        assert!(store.get_lead(lead.id).await.unwrap().is_none());
        assert!(store.list_comments(lead.id).await.unwrap().is_empty());
        assert!(matches!(
            store.delete_lead(lead.id).await,
            Err(LeadStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_comment_thread_sorted() {
        let store = memory_store().await;
        let lead_id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let now = Utc::now();

        for (text, offset) in [("third", 0), ("first", 20), ("second", 10)] {
            let mut comment = Comment::new(lead_id, author, text);
            comment.created_at = now - Duration::seconds(offset);
            store.create_comment(comment).await.unwrap();
        }

        let thread = store.list_comments(lead_id).await.unwrap();
        let texts: Vec<&str> = thread.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_comment_ties_keep_insertion_order() {
        let store = memory_store().await;
        let lead_id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let at = Utc::now();

        for text in ["one", "two", "three", "four"] {
            let mut comment = Comment::new(lead_id, author, text);
            comment.created_at = at;
            store.create_comment(comment).await.unwrap();
        }

        let thread = store.list_comments(lead_id).await.unwrap();
        let texts: Vec<&str> = thread.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four"]);
    }

    #[tokio::test]
    async fn test_time_to_close_beyond_column_range() {
        let store = memory_store().await;
        let mut lead = lead_for(vec![Uuid::new_v4()], LeadStatus::New, &[]);
        lead.time_to_close = u64::MAX;

        assert!(matches!(
            store.create_lead(lead).await,
            Err(LeadStoreError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_tags() {
        let store = memory_store().await;
        store
            .seed_tags(&["Warm".to_string(), "Cold".to_string()])
            .await
            .unwrap();
        assert!(matches!(
            store.create_tag(Tag::new("Warm")).await,
            Err(LeadStoreError::AlreadyExists { .. })
        ));

        let names: Vec<String> = store
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Cold", "Warm"]);
    }
}
