// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint paths and typed resource calls.
//!
//! Every resource call is a `POST`; list endpoints wrap their items in a
//! keyed envelope which is unwrapped here.

use appy_core::model::{Challenge, Cosmetic, NewsItem, Notification, RankingSnapshot};
use appy_core::{AppyError, NotificationTarget, QuizRequest, RankingKind, Section};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::types::PasswordResponse;
use crate::ApiGateway;

pub const AUTH_LOGIN: &str = "api/auth/login";
pub const AUTH_REFRESH: &str = "api/auth/refresh";
pub const AUTH_LOGOUT: &str = "api/auth/logout";
pub const AUTH_LOGON_USER: &str = "api/auth/logon_user";
pub const AUTH_FORGOT_PASSWORD: &str = "api/auth/forgot-password";
pub const AUTH_CHANGE_PASSWORD: &str = "api/auth/change_password";

pub const USER_BADGES: &str = "api/app/gamification_user_badges";
pub const LEARN_CONTENT_LIST: &str = "api/app/learn_content_list";
pub const USER_STARS: &str = "api/app/gamification_user_stars";
pub const USER_CHESTS: &str = "api/app/gamification_user_chests";
pub const TRIBES_LIST: &str = "api/app/tribes_list";
pub const TRIBES_JOIN: &str = "api/app/tribes_join";
pub const TRIBES_LEAVE: &str = "api/app/tribes_leave";
pub const TRIBE_MEMBERS: &str = "api/organization/tribe_members";
pub const NOTIFICATIONS: &str = "api/app/user_notifications";
pub const NOTIFICATION_READ: &str = "api/app/user_notification_read";
pub const NEWS: &str = "api/app/information_news";
pub const RANKING: &str = "api/app/ranking";
pub const CHALLENGES_LIST: &str = "api/app/challenges_list";
pub const CHALLENGES_START: &str = "api/app/challenges_start";
pub const CHALLENGE_ANSWER: &str = "api/app/challenge_answer";
pub const CHALLENGE_COMPLETE: &str = "api/app/challenge_complete";
pub const COSMETICS_LIST: &str = "api/app/cosmetics_list";
pub const COSMETICS_BUY: &str = "api/app/cosmetics_buy";
pub const COSMETICS_USE: &str = "api/app/cosmetics_use";
pub const QUOTES: &str = "gamification/quotes";
pub const BATTLE_LIST: &str = "api/app/battle_list";
pub const BATTLE_RESULT: &str = "api/app/battle_result";
pub const QUIZ_QUESTIONS: &str = "api/app/quiz_questions";
pub const ANSWER_RESULT: &str = "api/app/answer_result";
pub const QUIZ_QUIT: &str = "api/app/quiz_quit";
pub const NICKNAME_UPDATE: &str = "api/app/nickname_update";
pub const LEARN_CONTENT_FULL: &str = "api/app/learn_content_full";
pub const OPEN_CHEST: &str = "api/app/open_chest";
pub const ERROR_REPORT: &str = "api/app/error_report";

/// The endpoint backing a cache section; `None` for rankings, which are per metric.
pub fn section_endpoint(section: Section) -> Option<&'static str> {
    match section {
        Section::UserInfo => Some(USER_BADGES),
        Section::Disciplines => Some(LEARN_CONTENT_LIST),
        Section::UserStars => Some(USER_STARS),
        Section::UserChests => Some(USER_CHESTS),
        Section::Tribes => Some(TRIBES_LIST),
        Section::Notifications => Some(NOTIFICATIONS),
        Section::News => Some(NEWS),
        Section::Challenges => Some(CHALLENGES_LIST),
        Section::Cosmetics => Some(COSMETICS_LIST),
        Section::Quotes => Some(QUOTES),
        Section::Battles => Some(BATTLE_LIST),
        Section::Rankings => None,
    }
}

/// Payload of `quiz_questions` for each quiz kind.
pub fn quiz_payload(request: &QuizRequest) -> Value {
    match request {
        QuizRequest::Learn {
            content_id,
            difficulty,
        } => json!({"quizType": "learn", "contentId": content_id, "difficulty": difficulty}),
        QuizRequest::Challenge { challenge_id } => {
            json!({"quizType": "challenge", "challengeId": challenge_id})
        }
        QuizRequest::Battle => json!({"quizType": "battle"}),
    }
}

/// Decodes `body[key]` as a list, treating a missing key as empty.
fn list_field<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>, AppyError> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items).map_err(|e| AppyError::decode(key, e)),
        },
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| AppyError::decode(key, e)),
    }
}

impl ApiGateway {
    /// Requests a password reset email. Unauthenticated.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResponse, AppyError> {
        let options = crate::RequestOptions::default()
            .with_body(json!({ "email": email }))
            .unauthenticated();
        match self.request(AUTH_FORGOT_PASSWORD, options).await {
            Ok(response) => Ok(PasswordResponse::from_body(
                response.body,
                Some(response.status),
            )),
            Err(AppyError::RequestFailed { status, message }) => Ok(PasswordResponse {
                success: false,
                message,
                status: Some(status),
                raw: Value::Null,
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<PasswordResponse, AppyError> {
        let body = self
            .post(
                AUTH_CHANGE_PASSWORD,
                json!({
                    "currentPassword": current_password,
                    "newPassword": new_password,
                    "confirmPassword": confirm_password,
                }),
            )
            .await?;
        Ok(PasswordResponse::from_body(body, None))
    }

    /// Raw logon user payload (user, organization, feature flags).
    pub async fn get_logon_user(&self) -> Result<Value, AppyError> {
        self.post_empty(AUTH_LOGON_USER).await
    }

    pub async fn get_tribe_members(&self, tribe_id: i64) -> Result<Value, AppyError> {
        self.post(TRIBE_MEMBERS, json!({ "tribeId": tribe_id })).await
    }

    pub async fn join_tribe(&self, tribe_id: i64) -> Result<Value, AppyError> {
        self.post(TRIBES_JOIN, json!({ "tribeId": tribe_id })).await
    }

    pub async fn leave_tribe(&self) -> Result<Value, AppyError> {
        self.post_empty(TRIBES_LEAVE).await
    }

    pub async fn get_news(&self) -> Result<Vec<NewsItem>, AppyError> {
        list_field(self.post_empty(NEWS).await?, "news")
    }

    /// One news article; the backend answers with a one-element `news` list.
    pub async fn get_news_content(&self, news_id: i64) -> Result<Vec<NewsItem>, AppyError> {
        list_field(self.post(NEWS, json!({ "id": news_id })).await?, "news")
    }

    pub async fn get_notifications(&self) -> Result<Vec<Notification>, AppyError> {
        list_field(self.post_empty(NOTIFICATIONS).await?, "notifications")
    }

    pub async fn mark_notification_as_read(
        &self,
        target: NotificationTarget,
    ) -> Result<Value, AppyError> {
        self.post(
            NOTIFICATION_READ,
            json!({ "notificationId": target.wire_id() }),
        )
        .await
    }

    pub async fn get_rankings(&self, kind: RankingKind) -> Result<RankingSnapshot, AppyError> {
        let body = self.post(RANKING, json!({ "type": kind })).await?;
        if body.is_null() {
            return Ok(RankingSnapshot::default());
        }
        serde_json::from_value(body).map_err(|e| AppyError::decode("ranking", e))
    }

    pub async fn get_user_badges(&self, user_id: i64) -> Result<Value, AppyError> {
        self.post(USER_BADGES, json!({ "userId": user_id })).await
    }

    pub async fn get_cosmetics(&self) -> Result<Vec<Cosmetic>, AppyError> {
        list_field(self.post_empty(COSMETICS_LIST).await?, "items")
    }

    pub async fn purchase_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        self.post(COSMETICS_BUY, json!({ "cosmeticId": cosmetic_id }))
            .await
    }

    pub async fn use_cosmetic(&self, cosmetic_id: i64) -> Result<Value, AppyError> {
        self.post(COSMETICS_USE, json!({ "cosmeticId": cosmetic_id }))
            .await
    }

    pub async fn get_quiz_questions(&self, request: &QuizRequest) -> Result<Value, AppyError> {
        self.post(QUIZ_QUESTIONS, quiz_payload(request)).await
    }

    pub async fn submit_answer_result(
        &self,
        session_id: i64,
        quiz_id: i64,
        correct: bool,
        time_ms: u64,
        hero_used_id: Option<i64>,
    ) -> Result<Value, AppyError> {
        self.post(
            ANSWER_RESULT,
            json!({
                "sessionId": session_id,
                "quizId": quiz_id,
                "correct": correct,
                "timeMs": time_ms,
                "heroUsedId": hero_used_id,
            }),
        )
        .await
    }

    /// Abandons a quiz, submitting the unanswered question ids.
    pub async fn quit_quiz(
        &self,
        session_id: i64,
        remaining_quiz_ids: &[i64],
    ) -> Result<Value, AppyError> {
        self.post(
            QUIZ_QUIT,
            json!({ "sessionId": session_id, "quizIds": remaining_quiz_ids }),
        )
        .await
    }

    pub async fn update_nickname(&self, nickname: &str) -> Result<Value, AppyError> {
        self.post(NICKNAME_UPDATE, json!({ "nickname": nickname }))
            .await
    }

    pub async fn get_learn_content_full(&self, content_id: i64) -> Result<Value, AppyError> {
        self.post(LEARN_CONTENT_FULL, json!({ "id": content_id }))
            .await
    }

    pub async fn get_challenges(&self) -> Result<Vec<Challenge>, AppyError> {
        list_field(self.post_empty(CHALLENGES_LIST).await?, "challenges")
    }

    pub async fn start_challenge(&self, challenge_id: i64) -> Result<Value, AppyError> {
        self.post(CHALLENGES_START, json!({ "challengeId": challenge_id }))
            .await
    }

    pub async fn submit_challenge_answer(
        &self,
        challenge_id: i64,
        question_id: i64,
        answer_id: i64,
    ) -> Result<Value, AppyError> {
        self.post(
            CHALLENGE_ANSWER,
            json!({
                "challengeId": challenge_id,
                "questionId": question_id,
                "answerId": answer_id,
            }),
        )
        .await
    }

    pub async fn complete_challenge(&self, challenge_id: i64) -> Result<Value, AppyError> {
        self.post(CHALLENGE_COMPLETE, json!({ "challengeId": challenge_id }))
            .await
    }

    pub async fn open_chest(&self, chest_id: i64) -> Result<Value, AppyError> {
        self.post(OPEN_CHEST, json!({ "chestId": chest_id })).await
    }

    pub async fn get_battle_list(&self) -> Result<Value, AppyError> {
        self.post_empty(BATTLE_LIST).await
    }

    pub async fn get_battle_result(&self, battle_session_id: i64) -> Result<Value, AppyError> {
        self.post(
            BATTLE_RESULT,
            json!({ "battleSessionId": battle_session_id }),
        )
        .await
    }

    /// Flags a quiz question as wrong. The response body is ignored.
    pub async fn report_quiz_error(&self, quiz_id: i64) -> Result<(), AppyError> {
        self.post(ERROR_REPORT, json!({ "quizId": quiz_id })).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_but_rankings_has_an_endpoint() {
        for section in Section::ALL {
            assert_eq!(
                section_endpoint(section).is_none(),
                section == Section::Rankings,
                "{section}"
            );
        }
    }

    #[test]
    fn quiz_payload_variants() {
        let learn = quiz_payload(&QuizRequest::Learn {
            content_id: 12,
            difficulty: "hard".into(),
        });
        assert_eq!(learn, json!({"quizType": "learn", "contentId": 12, "difficulty": "hard"}));
        assert_eq!(
            quiz_payload(&QuizRequest::Challenge { challenge_id: 3 }),
            json!({"quizType": "challenge", "challengeId": 3})
        );
        assert_eq!(quiz_payload(&QuizRequest::Battle), json!({"quizType": "battle"}));
    }

    #[test]
    fn list_field_handles_envelopes() {
        let items: Vec<Cosmetic> =
            list_field(json!({"success": true, "items": [{"id": 1, "coins": 5}]}), "items")
                .unwrap();
        assert_eq!(items[0].coins, 5);

        let empty: Vec<Cosmetic> = list_field(json!({"success": true}), "items").unwrap();
        assert!(empty.is_empty());

        let bare: Vec<NewsItem> = list_field(json!([{"id": 9}]), "news").unwrap();
        assert_eq!(bare[0].id, 9);
    }
}
