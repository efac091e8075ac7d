use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use confess_types::models::{Category, ReactionCounts, Status, Verdict};

use crate::models::{AdminRow, ConfessionRow, StoreStats};
use crate::{Database, StoreError, StoreResult};

/// Shortest confession the store accepts, in characters.
pub const TEXT_MIN_CHARS: usize = 10;
/// Longest confession the store accepts, in characters.
pub const TEXT_MAX_CHARS: usize = 500;

const CONFESSION_COLS: &str =
    "id, text, category, status, love, laugh, fire, created_at, display_id";

impl Database {
    // -- Confessions --

    /// Insert a new confession in `pending` state and return the stored row.
    /// Text length is measured in characters, not bytes.
    pub fn create_confession(&self, text: &str, category: Category) -> StoreResult<ConfessionRow> {
        let length = text.chars().count();
        if length < TEXT_MIN_CHARS {
            return Err(StoreError::Validation(
                "Confession must be at least 10 characters".to_string(),
            ));
        }
        if length > TEXT_MAX_CHARS {
            return Err(StoreError::Validation(
                "Confession must not exceed 500 characters".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO confessions (id, text, category) VALUES (?1, ?2, ?3)",
                params![id, text, category.as_str()],
            )?;
            // display_id is the rowid, so this is the id just assigned
            let row = conn.query_row(
                &format!(
                    "SELECT {} FROM confessions WHERE display_id = ?1",
                    CONFESSION_COLS
                ),
                [conn.last_insert_rowid()],
                read_confession,
            )?;
            Ok(row)
        })
    }

    pub fn get_confession(&self, id: &str) -> StoreResult<Option<ConfessionRow>> {
        self.with_conn(|conn| query_confession(conn, id))
    }

    /// List confessions, optionally narrowed by status, a case-insensitive
    /// text substring, and a category. Filters combine with AND.
    pub fn list_confessions(
        &self,
        status: Option<Status>,
        search: Option<&str>,
        category: Option<&str>,
    ) -> StoreResult<Vec<ConfessionRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut values: Vec<String> = Vec::new();

            if let Some(status) = status {
                clauses.push("status = ?");
                values.push(status.as_str().to_string());
            }
            if let Some(search) = search {
                clauses.push(r"text LIKE ? ESCAPE '\'");
                values.push(format!("%{}%", escape_like(search)));
            }
            if let Some(category) = category {
                clauses.push("category = ?");
                values.push(category.to_string());
            }

            let mut sql = format!("SELECT {} FROM confessions", CONFESSION_COLS);
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            // created_at has second granularity; display_id breaks ties so
            // newest-first stays stable within the same second
            sql.push_str(" ORDER BY created_at DESC, display_id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = values
                .iter()
                .map(|v| v as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), read_confession)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Move a confession out of the review queue. Re-applying the same
    /// verdict is a no-op; `None` means no such confession.
    pub fn set_status(&self, id: &str, verdict: Verdict) -> StoreResult<Option<ConfessionRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE confessions SET status = ?1 WHERE id = ?2",
                params![verdict.as_str(), id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_confession(conn, id)
        })
    }

    /// Fold a client's counter snapshot into the stored counters, keeping
    /// the per-field maximum. Counters never move backwards, so two clients
    /// racing on different emoji both land; a stale snapshot cannot undo a
    /// newer one.
    pub fn merge_reactions(
        &self,
        id: &str,
        counts: ReactionCounts,
    ) -> StoreResult<Option<ConfessionRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE confessions
                 SET love = MAX(love, ?2), laugh = MAX(laugh, ?3), fire = MAX(fire, ?4)
                 WHERE id = ?1",
                params![id, counts.love, counts.laugh, counts.fire],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_confession(conn, id)
        })
    }

    /// Returns false when the id did not exist.
    pub fn delete_confession(&self, id: &str) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM confessions WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Board-wide aggregates in a single scan. Only approved confessions
    /// contribute to the public totals.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    COUNT(CASE WHEN status = 'approved' THEN 1 END),
                    COALESCE(SUM(CASE WHEN status = 'approved' THEN love + laugh + fire END), 0),
                    COUNT(CASE WHEN status = 'pending' THEN 1 END)
                 FROM confessions",
                [],
                |row| {
                    Ok(StoreStats {
                        total_approved: row.get(0)?,
                        total_reactions: row.get(1)?,
                        pending_count: row.get(2)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Admins --

    pub fn create_admin(&self, id: &str, username: &str, password_hash: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO admins (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> StoreResult<Option<AdminRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, created_at FROM admins WHERE username = ?1",
            )?;

            let row = stmt
                .query_row([username], |row| {
                    Ok(AdminRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }
}

fn query_confession(conn: &Connection, id: &str) -> StoreResult<Option<ConfessionRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM confessions WHERE id = ?1",
        CONFESSION_COLS
    ))?;

    let row = stmt.query_row([id], read_confession).optional()?;

    Ok(row)
}

fn read_confession(row: &rusqlite::Row) -> rusqlite::Result<ConfessionRow> {
    Ok(ConfessionRow {
        id: row.get(0)?,
        text: row.get(1)?,
        category: row.get(2)?,
        status: row.get(3)?,
        love: row.get(4)?,
        laugh: row.get(5)?,
        fire: row.get(6)?,
        created_at: row.get(7)?,
        display_id: row.get(8)?,
    })
}

/// Escape `%`, `_` and `\` so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed(db: &Database, text: &str, category: Category) -> ConfessionRow {
        db.create_confession(text, category).unwrap()
    }

    #[test]
    fn new_confessions_start_pending_with_zero_counters() {
        let db = store();
        let row = seed(&db, "I microwave maggi in the common room", Category::Hostel);

        assert_eq!(row.status, "pending");
        assert_eq!((row.love, row.laugh, row.fire), (0, 0, 0));
        assert_eq!(row.display_id, 1);
        assert!(!row.id.is_empty());
        assert!(!row.created_at.is_empty());
    }

    #[test]
    fn display_ids_increase_monotonically() {
        let db = store();
        let a = seed(&db, "first confession of the evening", Category::Other);
        let b = seed(&db, "second confession of the evening", Category::Other);
        let c = seed(&db, "third confession of the evening", Category::Other);

        assert!(a.display_id < b.display_id);
        assert!(b.display_id < c.display_id);
    }

    #[test]
    fn display_ids_are_never_reused_after_delete() {
        let db = store();
        seed(&db, "this one is going to stay around", Category::Other);
        let newest = seed(&db, "this one is about to be deleted", Category::Other);

        assert!(db.delete_confession(&newest.id).unwrap());

        let next = seed(&db, "created after the newest was deleted", Category::Other);
        assert!(next.display_id > newest.display_id);
        assert_eq!(next.display_id, 3);
    }

    #[test]
    fn rejects_text_outside_character_bounds() {
        let db = store();

        let short = db.create_confession("too short", Category::Other);
        assert!(matches!(short, Err(StoreError::Validation(_))));

        let long = "x".repeat(501);
        let long = db.create_confession(&long, Category::Other);
        assert!(matches!(long, Err(StoreError::Validation(_))));

        assert!(db.list_confessions(None, None, None).unwrap().is_empty());
    }

    #[test]
    fn accepts_text_at_the_character_bounds() {
        let db = store();

        assert!(db.create_confession(&"a".repeat(10), Category::Other).is_ok());
        assert!(db.create_confession(&"a".repeat(500), Category::Other).is_ok());

        // counted in characters, not bytes
        assert!(db.create_confession(&"💜".repeat(10), Category::Crush).is_ok());
    }

    #[test]
    fn list_filters_by_moderation_status() {
        let db = store();
        let a = seed(&db, "the canteen coffee is just brown water", Category::Roast);
        let b = seed(&db, "still waiting in the review queue here", Category::Roast);
        let c = seed(&db, "this one was too mean to publish", Category::Roast);
        db.set_status(&a.id, Verdict::Approved).unwrap();
        db.set_status(&c.id, Verdict::Rejected).unwrap();

        let approved = db.list_confessions(Some(Status::Approved), None, None).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);

        let pending = db.list_confessions(Some(Status::Pending), None, None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
    }

    #[test]
    fn search_matches_substrings_case_insensitively() {
        let db = store();
        let hit = seed(&db, "The Mess Food was amazing for once", Category::Hostel);
        seed(&db, "nothing relevant in this one at all", Category::Other);

        let rows = db.list_confessions(None, Some("mess food"), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, hit.id);
    }

    #[test]
    fn search_treats_like_wildcards_literally() {
        let db = store();
        let hit = seed(&db, "I scored 100% on the surprise quiz", Category::Academic);
        seed(&db, "I scored 100 marks on that same quiz", Category::Academic);
        seed(&db, "students rate the canteen food daily", Category::Hostel);

        let rows = db.list_confessions(None, Some("100%"), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, hit.id);

        // "_" must not act as a single-character wildcard
        let rows = db.list_confessions(None, Some("r_te"), None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn status_search_and_category_filters_compose() {
        let db = store();
        let hit = seed(&db, "the hostel wifi dies every exam week", Category::Hostel);
        seed(&db, "the hostel wifi is actually fine now", Category::Hostel);
        let off_topic = seed(&db, "exam week turns everyone into a poet", Category::Academic);
        db.set_status(&hit.id, Verdict::Approved).unwrap();
        db.set_status(&off_topic.id, Verdict::Approved).unwrap();

        let rows = db
            .list_confessions(Some(Status::Approved), Some("exam week"), Some("hostel"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, hit.id);

        let rows = db.list_confessions(None, None, Some("gossip")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn lists_come_back_newest_first() {
        let db = store();
        let first = seed(&db, "the first confession to arrive", Category::Other);
        let second = seed(&db, "the second confession to arrive", Category::Other);
        let third = seed(&db, "the third confession to arrive", Category::Other);

        let rows = db.list_confessions(None, None, None).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.display_id).collect();
        assert_eq!(ids, vec![third.display_id, second.display_id, first.display_id]);
    }

    #[test]
    fn approval_is_idempotent_and_rejection_sticks() {
        let db = store();
        let row = seed(&db, "please approve this one quickly", Category::Crush);

        let approved = db.set_status(&row.id, Verdict::Approved).unwrap().unwrap();
        assert_eq!(approved.status, "approved");

        let again = db.set_status(&row.id, Verdict::Approved).unwrap().unwrap();
        assert_eq!(again.status, "approved");

        let other = seed(&db, "and this one should disappear", Category::Roast);
        let rejected = db.set_status(&other.id, Verdict::Rejected).unwrap().unwrap();
        assert_eq!(rejected.status, "rejected");

        assert!(db.set_status("no-such-id", Verdict::Approved).unwrap().is_none());
    }

    #[test]
    fn reaction_merge_never_decreases_counters() {
        let db = store();
        let row = seed(&db, "somebody finally fixed the projector", Category::Funny);

        let first = ReactionCounts { love: 5, laugh: 2, fire: 0 };
        let updated = db.merge_reactions(&row.id, first).unwrap().unwrap();
        assert_eq!((updated.love, updated.laugh, updated.fire), (5, 2, 0));

        // a stale snapshot must not roll any counter back
        let stale = ReactionCounts { love: 3, laugh: 4, fire: 1 };
        let updated = db.merge_reactions(&row.id, stale).unwrap().unwrap();
        assert_eq!((updated.love, updated.laugh, updated.fire), (5, 4, 1));

        assert!(db.merge_reactions("no-such-id", first).unwrap().is_none());
    }

    #[test]
    fn delete_removes_the_row_exactly_once() {
        let db = store();
        let row = seed(&db, "delete me before anyone reads this", Category::Sad);

        assert!(db.delete_confession(&row.id).unwrap());
        assert!(db.get_confession(&row.id).unwrap().is_none());
        assert!(!db.delete_confession(&row.id).unwrap());
    }

    #[test]
    fn stats_are_zero_on_an_empty_store() {
        let db = store();
        let stats = db.stats().unwrap();

        assert_eq!(stats.total_approved, 0);
        assert_eq!(stats.total_reactions, 0);
        assert_eq!(stats.pending_count, 0);
    }

    #[test]
    fn stats_only_count_approved_confessions_and_their_reactions() {
        let db = store();
        let shown = seed(&db, "the lab assistant covered for all of us", Category::Academic);
        let queued = seed(&db, "still sitting in the moderation queue", Category::Other);
        let hidden = seed(&db, "this one never made it to the board", Category::Roast);
        db.set_status(&shown.id, Verdict::Approved).unwrap();
        db.set_status(&hidden.id, Verdict::Rejected).unwrap();

        db.merge_reactions(&shown.id, ReactionCounts { love: 2, laugh: 1, fire: 1 })
            .unwrap();
        db.merge_reactions(&queued.id, ReactionCounts { love: 9, laugh: 0, fire: 0 })
            .unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_approved, 1);
        assert_eq!(stats.total_reactions, 4);
        assert_eq!(stats.pending_count, 1);
    }

    #[test]
    fn admin_lookup_roundtrips() {
        let db = store();
        db.create_admin("admin-1", "admin", "argon2-hash-goes-here").unwrap();

        let row = db.get_admin_by_username("admin").unwrap().unwrap();
        assert_eq!(row.id, "admin-1");
        assert_eq!(row.password, "argon2-hash-goes-here");

        assert!(db.get_admin_by_username("intruder").unwrap().is_none());
    }

    #[test]
    fn duplicate_admin_usernames_are_rejected() {
        let db = store();
        db.create_admin("admin-1", "admin", "hash-a").unwrap();

        let err = db.create_admin("admin-2", "admin", "hash-b");
        assert!(matches!(err, Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn escape_like_escapes_every_wildcard() {
        assert_eq!(escape_like(r"100%_\"), r"100\%\_\\");
    }
}
