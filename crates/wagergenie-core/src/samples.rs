// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in sample data shown when the data provider has nothing to offer.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ChatMessage, ChatRole, Pick, PickResult};

/// The six demo picks, all dated `now`.
pub fn sample_picks(now: DateTime<Utc>) -> Vec<Pick> {
    let date = now.to_rfc3339();
    let pick = |id: &str,
                sport: &str,
                matchup: &str,
                prediction: &str,
                confidence: u8,
                result: PickResult,
                explanation: &str| Pick {
        id: id.to_string(),
        sport: sport.to_string(),
        matchup: matchup.to_string(),
        prediction: prediction.to_string(),
        confidence,
        result,
        explanation: explanation.to_string(),
        date: date.clone(),
    };

    vec![
        pick(
            "1",
            "NFL",
            "Kansas City Chiefs vs. Baltimore Ravens",
            "Chiefs -3.5",
            85,
            PickResult::Win,
            "Chiefs offense has been unstoppable at home.",
        ),
        pick(
            "2",
            "NBA",
            "Boston Celtics vs. Los Angeles Lakers",
            "Over 219.5",
            78,
            PickResult::Pending,
            "Both teams have been scoring at high rates in their last 5 games.",
        ),
        pick(
            "3",
            "MLB",
            "New York Yankees vs. Houston Astros",
            "Yankees ML",
            72,
            PickResult::Pending,
            "Yankees are starting their ace pitcher with a strong home record.",
        ),
        pick(
            "4",
            "UFC",
            "Jon Jones vs. Stipe Miocic",
            "Jones by KO/TKO",
            81,
            PickResult::Pending,
            "Jones has significant reach and striking advantages.",
        ),
        pick(
            "5",
            "NHL",
            "Toronto Maple Leafs vs. Montreal Canadiens",
            "Under 5.5 Goals",
            76,
            PickResult::Loss,
            "Both teams have strong goalies and have played low-scoring games recently.",
        ),
        pick(
            "6",
            "Soccer",
            "Manchester City vs. Liverpool",
            "Both Teams to Score",
            88,
            PickResult::Win,
            "Both teams are offensive powerhouses with some defensive weaknesses.",
        ),
    ]
}

/// The four demo chat messages, spread over the hour before `now`.
pub fn sample_messages(now: DateTime<Utc>) -> Vec<ChatMessage> {
    let msg = |id: &str, role: ChatRole, content: &str, secs_ago: i64| ChatMessage {
        id: id.to_string(),
        role,
        content: content.to_string(),
        timestamp: now - Duration::seconds(secs_ago),
    };

    vec![
        msg(
            "1",
            ChatRole::User,
            "Hi, I need some good picks for NFL games this weekend",
            3600,
        ),
        msg(
            "2",
            ChatRole::Assistant,
            "I've analyzed the upcoming NFL matchups and have three strong recommendations for you. \
             The Chiefs are favored at home against the Bengals, and I'm seeing value in taking the \
             Chiefs to cover. The Bills vs Jets game looks like it will be a low-scoring affair, so \
             consider the under. And for a value pick, the Lions have a good chance to upset the \
             Vikings based on current form.",
            3500,
        ),
        msg(
            "3",
            ChatRole::User,
            "Thanks! What about NBA games tonight?",
            1800,
        ),
        msg(
            "4",
            ChatRole::Assistant,
            "For NBA games tonight, I like the Celtics to cover against the Lakers. The Celtics' \
             perimeter defense matches up well against the Lakers' shooters. The Bucks vs 76ers \
             game has value on the over, as both teams have been scoring well and have defensive \
             injuries. I'd avoid the Suns vs Warriors game as it's too unpredictable with recent \
             roster changes.",
            1700,
        ),
    ]
}
