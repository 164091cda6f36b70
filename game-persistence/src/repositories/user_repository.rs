use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{duel_matches, game_results, prelude::*, user_achievements, users};
use crate::error::GameError;
use game_types::{GameHistoryEntry, GameHistoryPage, MergeResult, UserStats, UserView};

/// Profile fields supplied by the auth provider on sign-in.
#[derive(Debug, Clone, Default)]
pub struct AuthProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fold an anonymous identity into an authenticated one. All six merge
    /// steps run inside a single transaction; any failure rolls the whole
    /// claim back and surfaces as `MergeAborted`.
    pub async fn claim_anonymous(
        &self,
        auth_provider_id: &str,
        fingerprint: &str,
    ) -> Result<MergeResult, GameError> {
        let txn = self.db.begin().await?;
        match merge_identities(&txn, auth_provider_id, fingerprint).await {
            Ok(result) => {
                txn.commit().await.map_err(GameError::MergeAborted)?;
                Ok(result)
            }
            Err(err) => {
                txn.rollback().await.map_err(GameError::MergeAborted)?;
                tracing::warn!(error = %err, fingerprint, "identity merge rolled back");
                Err(match err {
                    GameError::Database(db_err) => GameError::MergeAborted(db_err),
                    other => other,
                })
            }
        }
    }

    /// Upsert on authenticated sign-in. Creates the account on first
    /// contact; on later sign-ins refreshes whatever profile fields the
    /// provider sent.
    pub async fn get_or_create_user(
        &self,
        auth_provider_id: &str,
        profile: AuthProfile,
    ) -> Result<UserView, GameError> {
        let existing = Users::find()
            .filter(users::Column::AuthProviderId.eq(auth_provider_id))
            .one(&self.db)
            .await?;

        let now = Utc::now();
        let model = match existing {
            Some(user) => {
                let mut active: users::ActiveModel = user.into();
                if let Some(name) = profile.display_name {
                    active.display_name = Set(name);
                }
                if let Some(avatar) = profile.avatar_url {
                    active.avatar_url = Set(Some(avatar));
                }
                if let Some(email) = profile.email {
                    active.email = Set(Some(email));
                }
                active.updated_at = Set(now.into());
                Users::update(active).exec(&self.db).await?
            }
            None => {
                let active = users::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    auth_provider_id: Set(Some(auth_provider_id.to_string())),
                    anon_fingerprint: Set(None),
                    display_name: Set(profile.display_name.unwrap_or_else(|| "Player".to_string())),
                    avatar_url: Set(profile.avatar_url),
                    email: Set(profile.email),
                    xp: Set(0),
                    level: Set(1),
                    title: Set("Viewer".to_string()),
                    streak_current: Set(0),
                    streak_best: Set(0),
                    last_play_date: Set(None),
                    deleted_at: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                let inserted = Users::insert(active).exec(&self.db).await?;
                Users::find_by_id(inserted.last_insert_id)
                    .one(&self.db)
                    .await?
                    .ok_or(GameError::UserNotFound)?
            }
        };

        Ok(model_to_view(model))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<UserView, GameError> {
        let user = self.find_active(user_id).await?;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = display_name {
            active.display_name = Set(name);
        }
        if let Some(avatar) = avatar_url {
            active.avatar_url = Set(Some(avatar));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(model_to_view(Users::update(active).exec(&self.db).await?))
    }

    pub async fn get_user_stats(&self, user_id: Uuid) -> Result<UserStats, GameError> {
        let user = self.find_active(user_id).await?;

        let games_played = GameResults::find()
            .filter(game_results::Column::UserId.eq(user_id))
            .filter(game_results::Column::Completed.eq(true))
            .count(&self.db)
            .await?;
        let games_won = GameResults::find()
            .filter(game_results::Column::UserId.eq(user_id))
            .filter(game_results::Column::Won.eq(true))
            .count(&self.db)
            .await?;

        let win_rate = if games_played > 0 {
            games_won as f64 / games_played as f64
        } else {
            0.0
        };

        Ok(UserStats {
            xp: user.xp,
            level: user.level,
            title: user.title,
            streak_current: user.streak_current,
            streak_best: user.streak_best,
            games_played,
            games_won,
            win_rate,
        })
    }

    /// Paginated per-game history, newest first. `page` is 1-based.
    pub async fn get_user_history(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<GameHistoryPage, GameError> {
        self.find_active(user_id).await?;

        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let total = GameResults::find()
            .filter(game_results::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        let rows = GameResults::find()
            .filter(game_results::Column::UserId.eq(user_id))
            .find_also_related(DailyGames)
            .order_by_desc(game_results::Column::CreatedAt)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(&self.db)
            .await?;

        let results = rows
            .into_iter()
            .map(|(result, game)| {
                let (game_date, mode) = match game {
                    Some(g) => (g.game_date.to_string(), g.mode),
                    None => (String::new(), String::new()),
                };
                GameHistoryEntry {
                    id: result.id,
                    daily_game_id: result.daily_game_id,
                    score: result.score.max(0) as u32,
                    max_score: result.max_score.max(0) as u32,
                    guesses_used: result.guesses_used.max(0) as u32,
                    completed: result.completed,
                    won: result.won,
                    completed_at: result.completed_at.map(|t| t.to_rfc3339()),
                    game_date,
                    mode,
                }
            })
            .collect();

        Ok(GameHistoryPage {
            results,
            total,
            page,
            limit,
        })
    }

    /// Account removal. PII is cleared and the row retained so game results
    /// and duel references keep their foreign keys.
    pub async fn soft_delete(&self, user_id: Uuid) -> Result<(), GameError> {
        let user = self.find_active(user_id).await?;
        let now = Utc::now();

        let mut active: users::ActiveModel = user.into();
        active.auth_provider_id = Set(None);
        active.anon_fingerprint = Set(None);
        active.display_name = Set("Deleted Player".to_string());
        active.avatar_url = Set(None);
        active.email = Set(None);
        active.deleted_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        Users::update(active).exec(&self.db).await?;

        Ok(())
    }

    async fn find_active(&self, user_id: Uuid) -> Result<users::Model, GameError> {
        Users::find_by_id(user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(GameError::UserNotFound)
    }
}

/// The merge itself, generic over the storage handle so the caller owns
/// the transaction boundary.
pub async fn merge_identities<C: ConnectionTrait>(
    conn: &C,
    auth_provider_id: &str,
    fingerprint: &str,
) -> Result<MergeResult, GameError> {
    let auth = Users::find()
        .filter(users::Column::AuthProviderId.eq(auth_provider_id))
        .filter(users::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(GameError::UserNotFound)?;

    let mut anon_query = Users::find()
        .filter(users::Column::AnonFingerprint.eq(fingerprint))
        .filter(users::Column::DeletedAt.is_null());
    // SQLite serializes writers on its own; row locks exist on Postgres only.
    if conn.get_database_backend() == DatabaseBackend::Postgres {
        anon_query = anon_query.lock_exclusive();
    }
    let anon = anon_query
        .one(conn)
        .await?
        .ok_or(GameError::UserNotFound)?;

    if anon.id == auth.id {
        return Err(GameError::SelfMergeRejected);
    }

    // Step 1: reassign game results. A daily game the authenticated user
    // already has a result for keeps that result; the anonymous duplicate
    // is counted and removed (it cannot outlive its owner row).
    let taken: Vec<Uuid> = GameResults::find()
        .filter(game_results::Column::UserId.eq(auth.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.daily_game_id)
        .collect();

    let merged = GameResults::update_many()
        .col_expr(game_results::Column::UserId, Expr::value(auth.id))
        .filter(game_results::Column::UserId.eq(anon.id))
        .filter(game_results::Column::DailyGameId.is_not_in(taken.clone()))
        .exec(conn)
        .await?
        .rows_affected;

    let conflicts = GameResults::delete_many()
        .filter(game_results::Column::UserId.eq(anon.id))
        .filter(game_results::Column::DailyGameId.is_in(taken))
        .exec(conn)
        .await?
        .rows_affected;
    let skipped = conflicts;

    // Step 2: re-home achievement unlocks, first-unlock wins.
    let anon_unlocks = UserAchievements::find()
        .filter(user_achievements::Column::UserId.eq(anon.id))
        .all(conn)
        .await?;
    let achievements_merged = if anon_unlocks.is_empty() {
        0
    } else {
        let rehomed = anon_unlocks
            .iter()
            .map(|unlock| user_achievements::ActiveModel {
                user_id: Set(auth.id),
                achievement_id: Set(unlock.achievement_id.clone()),
                unlocked_at: Set(unlock.unlocked_at),
            });
        UserAchievements::insert_many(rehomed)
            .on_conflict(
                OnConflict::columns([
                    user_achievements::Column::UserId,
                    user_achievements::Column::AchievementId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?
    };
    UserAchievements::delete_many()
        .filter(user_achievements::Column::UserId.eq(anon.id))
        .exec(conn)
        .await?;

    // Step 3: rewrite duel references, every mention of the anonymous id.
    let mut duel_matches_updated = 0;
    for column in [
        duel_matches::Column::Player1Id,
        duel_matches::Column::Player2Id,
        duel_matches::Column::WinnerId,
    ] {
        duel_matches_updated += DuelMatches::update_many()
            .col_expr(column, Expr::value(auth.id))
            .filter(column.eq(anon.id))
            .exec(conn)
            .await?
            .rows_affected;
    }

    // Step 4: transfer progression.
    let xp_transferred = anon.xp;
    let mut auth_active: users::ActiveModel = auth.clone().into();
    auth_active.xp = Set(auth.xp + anon.xp);
    auth_active.streak_best = Set(auth.streak_best.max(anon.streak_best));
    auth_active.updated_at = Set(Utc::now().into());
    Users::update(auth_active).exec(conn).await?;

    // Step 5: the anonymous identity ceases to exist.
    Users::delete_by_id(anon.id).exec(conn).await?;

    let result = MergeResult {
        merged,
        skipped,
        conflicts,
        achievements_merged,
        duel_matches_updated,
        xp_transferred,
    };

    // Step 6: audit record.
    tracing::info!(
        target: "merge_audit",
        auth_user = %auth.id,
        anon_user = %anon.id,
        fingerprint,
        merged = result.merged,
        skipped = result.skipped,
        conflicts = result.conflicts,
        achievements_merged = result.achievements_merged,
        duel_matches_updated = result.duel_matches_updated,
        xp_transferred = result.xp_transferred,
        "anonymous identity claimed"
    );

    Ok(result)
}

fn model_to_view(user: users::Model) -> UserView {
    UserView {
        id: user.id,
        display_name: user.display_name,
        avatar_url: user.avatar_url,
        email: user.email,
        xp: user.xp,
        level: user.level,
        title: user.title,
        streak_current: user.streak_current,
        streak_best: user.streak_best,
        created_at: user.created_at.to_rfc3339(),
    }
}
