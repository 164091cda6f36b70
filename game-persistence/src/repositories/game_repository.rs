use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::{daily_games, frames, game_results, prelude::*, users, videos};
use crate::error::GameError;
use crate::frames::FrameUrlSigner;
use game_core::{FRAMES_PER_GAME, MAX_GUESSES, calculate_score, scoring, validate_guess};
use game_types::{DailyGame, GameResultView, Guess, GuessOutcome};

/// The mode tag of the flagship daily game.
pub const DAILY_FRAME_MODE: &str = "daily_frame";

pub struct GameRepository {
    db: DatabaseConnection,
    frame_signer: Arc<dyn FrameUrlSigner>,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection, frame_signer: Arc<dyn FrameUrlSigner>) -> Self {
        Self { db, frame_signer }
    }

    /// Today's scheduled daily-frame game with presigned frame URLs, or
    /// None if nothing is scheduled.
    pub async fn todays_game(&self) -> Result<Option<DailyGame>, GameError> {
        let today = Utc::now().date_naive();
        let game = DailyGames::find()
            .filter(daily_games::Column::GameDate.eq(today))
            .filter(daily_games::Column::Mode.eq(DAILY_FRAME_MODE))
            .one(&self.db)
            .await?;

        let Some(game) = game else {
            return Ok(None);
        };
        let video_id = game.video_id.as_deref().ok_or(GameError::VideoNotFound)?;

        let keys = self.frame_keys(video_id).await?;
        let frames = self.frame_signer.presigned_urls(&keys).await;

        Ok(Some(DailyGame {
            id: game.id,
            game_number: game.game_number,
            mode: game.mode,
            date: game.game_date.to_string(),
            max_guesses: MAX_GUESSES,
            frames,
        }))
    }

    /// Submit one guess for a daily game on behalf of the identity behind
    /// `fingerprint`, creating that identity on first contact.
    pub async fn submit_guess(
        &self,
        daily_game_id: Uuid,
        guess_text: &str,
        fingerprint: &str,
    ) -> Result<GuessOutcome, GameError> {
        let game = DailyGames::find_by_id(daily_game_id)
            .one(&self.db)
            .await?
            .ok_or(GameError::GameNotFound)?;

        let video_id = game.video_id.ok_or(GameError::VideoNotFound)?;
        let video = Videos::find()
            .filter(videos::Column::VideoId.eq(&video_id))
            .one(&self.db)
            .await?
            .ok_or(GameError::VideoNotFound)?;

        let user = self.get_or_create_anon_user(fingerprint).await?;

        let existing = GameResults::find()
            .filter(game_results::Column::UserId.eq(user.id))
            .filter(game_results::Column::DailyGameId.eq(daily_game_id))
            .one(&self.db)
            .await?;

        if existing.as_ref().is_some_and(|r| r.completed) {
            return Err(GameError::AlreadyCompleted);
        }

        let mut guesses = match &existing {
            Some(result) => parse_guesses(&result.guesses_data)?,
            None => Vec::new(),
        };

        let validation = validate_guess(guess_text, &video.title, &video.channel);
        let now = Utc::now();

        let guess = Guess {
            id: format!("guess-{}", guesses.len() + 1),
            text: guess_text.to_string(),
            correct: validation.correct,
            similarity: validation.similarity,
            timestamp: now.timestamp_millis(),
        };
        guesses.push(guess.clone());

        let guesses_used = guesses.len() as u32;
        let game_over = validation.correct || guesses_used >= MAX_GUESSES;
        let won = validation.correct;

        // Elapsed time is measured from the result row's creation; the very
        // first guess scores as instantaneous.
        let time_ms: u64 = existing
            .as_ref()
            .map(|r| {
                (now - r.created_at.with_timezone(&Utc))
                    .num_milliseconds()
                    .max(0) as u64
            })
            .unwrap_or(0);
        let score = if won {
            calculate_score(guesses_used, MAX_GUESSES, time_ms)
        } else {
            0
        };

        let next_frame_url = if game_over {
            None
        } else {
            self.next_frame_url(&video.video_id, guesses_used).await?
        };

        let guesses_json = serde_json::to_value(&guesses)?;
        match existing {
            Some(result) => {
                let mut active: game_results::ActiveModel = result.into();
                active.guesses_data = Set(guesses_json);
                active.guesses_used = Set(guesses_used as i16);
                active.score = Set(score as i32);
                active.completed = Set(game_over);
                active.won = Set(if game_over { Some(won) } else { None });
                if game_over {
                    active.time_ms = Set(Some(clamp_time_ms(time_ms)));
                    active.completed_at = Set(Some(now.into()));
                }
                GameResults::update(active).exec(&self.db).await?;
            }
            None => {
                let active = game_results::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(Some(user.id)),
                    daily_game_id: Set(daily_game_id),
                    score: Set(score as i32),
                    max_score: Set(scoring::BASE_SCORE as i32),
                    guesses_used: Set(guesses_used as i16),
                    guesses_data: Set(guesses_json),
                    time_ms: Set(game_over.then_some(clamp_time_ms(time_ms))),
                    completed: Set(game_over),
                    won: Set(if game_over { Some(won) } else { None }),
                    completed_at: Set(game_over.then(|| now.into())),
                    created_at: Set(now.into()),
                };
                GameResults::insert(active).exec(&self.db).await?;
            }
        }

        Ok(GuessOutcome {
            correct: validation.correct,
            similarity: validation.similarity,
            guess,
            game_over,
            won,
            score,
            answer: game_over.then(|| video.title),
            next_frame_url,
        })
    }

    /// A player's stored result for one game. The answer title is included
    /// only once the game is completed.
    pub async fn get_result(
        &self,
        daily_game_id: Uuid,
        fingerprint: &str,
    ) -> Result<Option<GameResultView>, GameError> {
        let Some(user) = Users::find()
            .filter(users::Column::AnonFingerprint.eq(fingerprint))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(result) = GameResults::find()
            .filter(game_results::Column::UserId.eq(user.id))
            .filter(game_results::Column::DailyGameId.eq(daily_game_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut answer = None;
        if result.completed {
            if let Some(game) = DailyGames::find_by_id(daily_game_id).one(&self.db).await? {
                if let Some(video_id) = game.video_id {
                    answer = Videos::find()
                        .filter(videos::Column::VideoId.eq(video_id))
                        .one(&self.db)
                        .await?
                        .map(|v| v.title);
                }
            }
        }

        Ok(Some(GameResultView {
            id: result.id,
            daily_game_id: result.daily_game_id,
            guesses: parse_guesses(&result.guesses_data)?,
            score: result.score.max(0) as u32,
            won: result.won,
            completed: result.completed,
            answer,
        }))
    }

    /// Find or create the anonymous identity for a fingerprint. Idempotent:
    /// a concurrent first contact loses the unique-index race and refetches.
    async fn get_or_create_anon_user(&self, fingerprint: &str) -> Result<users::Model, GameError> {
        if let Some(user) = Users::find()
            .filter(users::Column::AnonFingerprint.eq(fingerprint))
            .one(&self.db)
            .await?
        {
            return Ok(user);
        }

        let now = Utc::now();
        let active = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            auth_provider_id: Set(None),
            anon_fingerprint: Set(Some(fingerprint.to_string())),
            display_name: Set("Player".to_string()),
            avatar_url: Set(None),
            email: Set(None),
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

        match Users::insert(active).exec(&self.db).await {
            Ok(inserted) => Users::find_by_id(inserted.last_insert_id)
                .one(&self.db)
                .await?
                .ok_or(GameError::UserNotFound),
            Err(err) => Users::find()
                .filter(users::Column::AnonFingerprint.eq(fingerprint))
                .one(&self.db)
                .await?
                .ok_or(GameError::Database(err)),
        }
    }

    /// Storage keys of the game's frames in reveal (rank) order.
    async fn frame_keys(&self, video_id: &str) -> Result<Vec<String>, GameError> {
        let rows = Frames::find()
            .filter(frames::Column::VideoId.eq(video_id))
            .order_by_asc(frames::Column::Rank)
            .limit(FRAMES_PER_GAME as u64)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|f| f.storage_key).collect())
    }

    /// Presigned URL for the frame revealed after `guesses_used` guesses
    /// (frame 0 is shown up front), if such a frame exists.
    async fn next_frame_url(
        &self,
        video_id: &str,
        guesses_used: u32,
    ) -> Result<Option<String>, GameError> {
        let keys = self.frame_keys(video_id).await?;
        let Some(key) = keys.get(guesses_used as usize) else {
            return Ok(None);
        };

        Ok(self
            .frame_signer
            .presigned_urls(std::slice::from_ref(key))
            .await
            .into_iter()
            .next())
    }
}

fn parse_guesses(data: &serde_json::Value) -> Result<Vec<Guess>, GameError> {
    Ok(serde_json::from_value(data.clone())?)
}

// The column is 32-bit; a session left open for weeks saturates instead
// of wrapping negative.
fn clamp_time_ms(time_ms: u64) -> i32 {
    i32::try_from(time_ms).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use async_trait::async_trait;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::ActiveModelTrait;

    struct TestSigner;

    #[async_trait]
    impl FrameUrlSigner for TestSigner {
        async fn presigned_urls(&self, keys: &[String]) -> Vec<String> {
            keys.iter()
                .map(|k| format!("https://frames.test/{k}?sig=test"))
                .collect()
        }
    }

    async fn setup_test_db() -> GameRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        GameRepository::new(db, Arc::new(TestSigner))
    }

    async fn seed_video(repo: &GameRepository, video_id: &str, title: &str, channel: &str) {
        let now = Utc::now();
        videos::ActiveModel {
            id: Set(Uuid::new_v4()),
            video_id: Set(video_id.to_string()),
            title: Set(title.to_string()),
            channel: Set(channel.to_string()),
            channel_id: Set(None),
            category: Set(None),
            duration: Set(600),
            view_count: Set(Some(1_000_000)),
            upload_date: Set(None),
            difficulty: Set(Some(5)),
            created_at: Set(now.into()),
        }
        .insert(&repo.db)
        .await
        .unwrap();

        for rank in 0..6i16 {
            frames::ActiveModel {
                id: Set(Uuid::new_v4()),
                video_id: Set(video_id.to_string()),
                rank: Set(rank),
                timestamp_sec: Set(rank as f32 * 30.0),
                storage_key: Set(format!("frames/{video_id}/{rank}.webp")),
                width: Set(Some(1280)),
                height: Set(Some(720)),
                created_at: Set(now.into()),
            }
            .insert(&repo.db)
            .await
            .unwrap();
        }
    }

    async fn seed_daily_game(repo: &GameRepository, video_id: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        daily_games::ActiveModel {
            id: Set(id),
            game_date: Set(Utc::now().date_naive()),
            mode: Set(DAILY_FRAME_MODE.to_string()),
            game_number: Set(1),
            video_id: Set(video_id.map(str::to_string)),
            config: Set(serde_json::json!({})),
            seed: Set(42),
            created_at: Set(Utc::now().into()),
        }
        .insert(&repo.db)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_exact_match_wins_after_normalization() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-1", "the title!!", "Some Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-1")).await;

        let outcome = repo
            .submit_guess(game_id, "The Title", "fp-exact")
            .await
            .unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.similarity, 1.0);
        assert!(outcome.game_over);
        assert!(outcome.won);
        // First guess, zero elapsed: 1000 base + 30 remaining seconds * 2
        assert_eq!(outcome.score, 1_060);
        assert_eq!(outcome.answer.as_deref(), Some("the title!!"));
        assert!(outcome.next_frame_url.is_none());
    }

    #[tokio::test]
    async fn test_fuzzy_title_match_counts_as_win() {
        let repo = setup_test_db().await;
        seed_video(
            &repo,
            "vid-2",
            "I Spent 50 Hours In Solitary Confinement",
            "MrBeast",
        )
        .await;
        let game_id = seed_daily_game(&repo, Some("vid-2")).await;

        let outcome = repo
            .submit_guess(
                game_id,
                "i spent 50 hours in solitary confinment",
                "fp-fuzzy",
            )
            .await
            .unwrap();

        assert!(outcome.correct);
        assert!(outcome.similarity >= 0.85);
        assert!(outcome.won);
    }

    #[tokio::test]
    async fn test_wrong_guess_reveals_next_frame() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-3", "Actual Video Title", "Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-3")).await;

        let outcome = repo
            .submit_guess(game_id, "totally wrong", "fp-frames")
            .await
            .unwrap();

        assert!(!outcome.correct);
        assert!(!outcome.game_over);
        assert_eq!(outcome.score, 0);
        assert!(outcome.answer.is_none());
        // One guess used: frame index 1 is revealed next.
        assert_eq!(
            outcome.next_frame_url.as_deref(),
            Some("https://frames.test/frames/vid-3/1.webp?sig=test")
        );
    }

    #[tokio::test]
    async fn test_six_wrong_guesses_lose_then_reject() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-4", "Actual Video Title", "Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-4")).await;

        for i in 1..=5 {
            let outcome = repo
                .submit_guess(game_id, &format!("wrong {i}"), "fp-loser")
                .await
                .unwrap();
            assert!(!outcome.game_over, "guess {i} ended the game early");
        }

        let sixth = repo
            .submit_guess(game_id, "wrong 6", "fp-loser")
            .await
            .unwrap();
        assert!(sixth.game_over);
        assert!(!sixth.won);
        assert_eq!(sixth.score, 0);
        assert_eq!(sixth.answer.as_deref(), Some("Actual Video Title"));
        assert!(sixth.next_frame_url.is_none());

        let seventh = repo.submit_guess(game_id, "wrong 7", "fp-loser").await;
        assert!(matches!(seventh, Err(GameError::AlreadyCompleted)));

        // The stored record is untouched by the rejected submission.
        let result = repo.get_result(game_id, "fp-loser").await.unwrap().unwrap();
        assert_eq!(result.guesses.len(), 6);
        assert!(result.completed);
        assert_eq!(result.won, Some(false));
    }

    #[tokio::test]
    async fn test_guesses_append_in_order_for_one_identity() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-5", "Actual Video Title", "Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-5")).await;

        repo.submit_guess(game_id, "first try", "fp-repeat")
            .await
            .unwrap();
        repo.submit_guess(game_id, "second try", "fp-repeat")
            .await
            .unwrap();

        // The same fingerprint maps to one user and one result row.
        let result = repo
            .get_result(game_id, "fp-repeat")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.guesses.len(), 2);
        assert_eq!(result.guesses[0].text, "first try");
        assert_eq!(result.guesses[0].id, "guess-1");
        assert_eq!(result.guesses[1].text, "second try");
        assert_eq!(result.guesses[1].id, "guess-2");
        assert!(!result.completed);
        assert!(result.answer.is_none());
    }

    #[tokio::test]
    async fn test_weeks_old_session_saturates_stored_time() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-8", "Actual Video Title", "Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-8")).await;

        repo.submit_guess(game_id, "wrong opener", "fp-slow")
            .await
            .unwrap();

        // Backdate the session start far past what an i32 of milliseconds
        // can represent.
        let row = GameResults::find()
            .filter(game_results::Column::DailyGameId.eq(game_id))
            .one(&repo.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: game_results::ActiveModel = row.into();
        active.created_at = Set((Utc::now() - chrono::Duration::days(40)).into());
        GameResults::update(active).exec(&repo.db).await.unwrap();

        let outcome = repo
            .submit_guess(game_id, "actual video title", "fp-slow")
            .await
            .unwrap();
        assert!(outcome.won);
        // Two guesses, no time bonus at this age: 1000 - 150.
        assert_eq!(outcome.score, 850);

        let stored = GameResults::find()
            .filter(game_results::Column::DailyGameId.eq(game_id))
            .one(&repo.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.time_ms, Some(i32::MAX));
    }

    #[tokio::test]
    async fn test_game_and_video_not_found() {
        let repo = setup_test_db().await;

        let missing = repo.submit_guess(Uuid::new_v4(), "anything", "fp-x").await;
        assert!(matches!(missing, Err(GameError::GameNotFound)));

        let game_id = seed_daily_game(&repo, None).await;
        let no_video = repo.submit_guess(game_id, "anything", "fp-x").await;
        assert!(matches!(no_video, Err(GameError::VideoNotFound)));
    }

    #[tokio::test]
    async fn test_get_result_unknown_identity_or_game() {
        let repo = setup_test_db().await;
        seed_video(&repo, "vid-6", "Actual Video Title", "Channel").await;
        let game_id = seed_daily_game(&repo, Some("vid-6")).await;

        assert!(
            repo.get_result(game_id, "never-played")
                .await
                .unwrap()
                .is_none()
        );

        repo.submit_guess(game_id, "a guess", "fp-played")
            .await
            .unwrap();
        assert!(
            repo.get_result(Uuid::new_v4(), "fp-played")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.get_result(game_id, "fp-played")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_todays_game_serves_presigned_frames() {
        let repo = setup_test_db().await;
        assert!(repo.todays_game().await.unwrap().is_none());

        seed_video(&repo, "vid-7", "Actual Video Title", "Channel").await;
        seed_daily_game(&repo, Some("vid-7")).await;

        let game = repo.todays_game().await.unwrap().unwrap();
        assert_eq!(game.mode, DAILY_FRAME_MODE);
        assert_eq!(game.max_guesses, 6);
        assert_eq!(game.frames.len(), 6);
        assert!(game.frames[0].starts_with("https://frames.test/frames/vid-7/0.webp"));
    }
}
