// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image URL rewriting over typed payloads.
//!
//! Each function takes a payload by value and returns it with every remote
//! image URL replaced by its [`ImageCache`] reference. Only URLs starting
//! with `http` are touched; bundled asset paths pass through unchanged.

use appy_core::model::{Area, Badge, Challenge, Cosmetic, User, UserInfo};

use crate::images::ImageCache;
use crate::normalize::SectionPayload;

async fn url(cache: &ImageCache, value: Option<String>) -> Option<String> {
    match value {
        Some(url) if url.starts_with("http") => Some(cache.resolve(&url).await),
        other => other,
    }
}

pub async fn user(cache: &ImageCache, user: User) -> User {
    User {
        avatar_url: url(cache, user.avatar_url.clone()).await,
        frame_url: url(cache, user.frame_url.clone()).await,
        background_url: url(cache, user.background_url.clone()).await,
        ..user
    }
}

pub async fn badge(cache: &ImageCache, badge: Badge) -> Badge {
    Badge {
        image_url: url(cache, badge.image_url.clone()).await,
        ..badge
    }
}

pub async fn user_info(cache: &ImageCache, info: UserInfo) -> UserInfo {
    let user = match info.user.clone() {
        Some(u) => Some(self::user(cache, u).await),
        None => None,
    };
    let mut items = Vec::with_capacity(info.items.len());
    for item in info.items.clone() {
        items.push(badge(cache, item).await);
    }
    UserInfo { user, items, ..info }
}

pub async fn areas(cache: &ImageCache, areas: Vec<Area>) -> Vec<Area> {
    let mut out = Vec::with_capacity(areas.len());
    for mut area in areas {
        area.icon_url = url(cache, area.icon_url).await;
        let mut categories = Vec::with_capacity(area.categories.len());
        for mut category in std::mem::take(&mut area.categories) {
            category.icon_url = url(cache, category.icon_url).await;
            let mut contents = Vec::with_capacity(category.contents.len());
            for mut content in std::mem::take(&mut category.contents) {
                content.image_url = url(cache, content.image_url).await;
                content.thumbnail_url = url(cache, content.thumbnail_url).await;
                contents.push(content);
            }
            category.contents = contents;
            categories.push(category);
        }
        area.categories = categories;
        out.push(area);
    }
    out
}

pub async fn cosmetics(cache: &ImageCache, items: Vec<Cosmetic>) -> Vec<Cosmetic> {
    let mut out = Vec::with_capacity(items.len());
    for mut item in items {
        item.image_url = url(cache, item.image_url).await;
        item.preview_url = url(cache, item.preview_url).await;
        out.push(item);
    }
    out
}

pub async fn challenges(cache: &ImageCache, items: Vec<Challenge>) -> Vec<Challenge> {
    let mut out = Vec::with_capacity(items.len());
    for mut item in items {
        item.image_url = url(cache, item.image_url).await;
        out.push(item);
    }
    out
}

/// Rewrites the image-bearing sections; others are returned as is.
pub async fn section(cache: &ImageCache, payload: SectionPayload) -> SectionPayload {
    match payload {
        SectionPayload::UserInfo(info) => SectionPayload::UserInfo(user_info(cache, info).await),
        SectionPayload::Disciplines(list) => SectionPayload::Disciplines(areas(cache, list).await),
        SectionPayload::Cosmetics(list) => SectionPayload::Cosmetics(cosmetics(cache, list).await),
        SectionPayload::Challenges(list) => {
            SectionPayload::Challenges(challenges(cache, list).await)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use appy_core::AppyError;
    use async_trait::async_trait;

    use super::*;
    use crate::images::ImageFetcher;

    struct Tagging;

    #[async_trait]
    impl ImageFetcher for Tagging {
        async fn fetch(&self, url: &str) -> Result<String, AppyError> {
            Ok(format!("local:{url}"))
        }
    }

    fn cache() -> ImageCache {
        ImageCache::new(Arc::new(Tagging), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn only_remote_urls_are_rewritten() {
        let input = User {
            avatar_url: Some("https://cdn/a.png".into()),
            frame_url: Some("assets/frame.png".into()),
            background_url: None,
            nickname: Some("ada".into()),
            ..User::default()
        };
        let out = user(&cache(), input).await;
        assert_eq!(out.avatar_url.as_deref(), Some("local:https://cdn/a.png"));
        assert_eq!(out.frame_url.as_deref(), Some("assets/frame.png"));
        assert_eq!(out.background_url, None);
        assert_eq!(out.nickname.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn nested_discipline_images_are_rewritten() {
        let areas_in: Vec<Area> = serde_json::from_value(serde_json::json!([{
            "id": 1,
            "iconUrl": "http://cdn/area.png",
            "categories": [{
                "id": 2,
                "iconUrl": "http://cdn/cat.png",
                "contents": [{"id": 3, "imageUrl": "http://cdn/c.png", "thumbnailUrl": "t.png"}]
            }]
        }]))
        .unwrap();

        let out = areas(&cache(), areas_in).await;
        let content = &out[0].categories[0].contents[0];
        assert_eq!(out[0].icon_url.as_deref(), Some("local:http://cdn/area.png"));
        assert_eq!(
            out[0].categories[0].icon_url.as_deref(),
            Some("local:http://cdn/cat.png")
        );
        assert_eq!(content.image_url.as_deref(), Some("local:http://cdn/c.png"));
        assert_eq!(content.thumbnail_url.as_deref(), Some("t.png"));
    }

    #[tokio::test]
    async fn sections_without_images_pass_through() {
        let payload = SectionPayload::News(vec![]);
        assert_eq!(section(&cache(), payload.clone()).await, payload);
    }
}
