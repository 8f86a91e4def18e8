//! Embed builders for watchlist and contact responses
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{truncate_chars, truncate_for_embed};
use crate::database::{Contact, WatchlistItem, WatchlistStatus};
use serenity::builder::CreateEmbed;
use serenity::model::Timestamp;

pub const WATCHLIST_COLOR: u32 = 0x00A67E;
pub const WHOIS_COLOR: u32 = 0x5865F2;

/// Items shown per `/watchlist` reply
pub const WATCHLIST_PAGE_SIZE: usize = 10;

/// Role mentions longer than this are cut to the first `ROLE_LIST_CAP` roles
const ROLE_LIST_CHARS: usize = 1000;
const ROLE_LIST_CAP: usize = 20;

const PLACEHOLDER: &str = "—";

/// `<search>/<title-slug>`, e.g. `https://example.com/search/the-dark-knight`
pub fn watch_link(search_url: &str, title: &str) -> String {
    let slug = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("{}/{}", search_url.trim_end_matches('/'), slug)
}

/// One markdown line per item:
/// `` `id` 🟢 **Title** (year) • platform — note — [IMDB](<url>) — [Watch](<url>) ``
pub fn watchlist_line(item: &WatchlistItem, watch_search: Option<&str>) -> String {
    let tag = match item.status {
        WatchlistStatus::Done => "✅",
        WatchlistStatus::Open => "🟢",
    };
    let mut line = format!("`{}` {} **{}**", item.id, tag, item.title);
    if let Some(year) = &item.year {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(platform) = &item.platform {
        line.push_str(&format!(" • {platform}"));
    }
    if !item.note.is_empty() {
        line.push_str(&format!(" — {}", truncate_chars(&item.note, 50)));
    }
    if let Some(link) = &item.link {
        line.push_str(&format!(" — [IMDB](<{link}>)"));
    }
    if let Some(search) = watch_search {
        line.push_str(&format!(" — [Watch](<{}>)", watch_link(search, &item.title)));
    }
    line
}

pub fn watchlist_footer(total: usize) -> String {
    if total > WATCHLIST_PAGE_SIZE {
        format!("Showing {WATCHLIST_PAGE_SIZE} of {total}")
    } else {
        format!("Total: {total}")
    }
}

/// Watchlist embed for the first page of `items` (already in id order)
pub fn watchlist_embed(
    owner_name: &str,
    items: &[WatchlistItem],
    watch_search: Option<&str>,
) -> CreateEmbed {
    let lines: Vec<String> = items
        .iter()
        .take(WATCHLIST_PAGE_SIZE)
        .map(|item| watchlist_line(item, watch_search))
        .collect();

    let mut embed = CreateEmbed::default();
    embed.title(format!("Watchlist • {owner_name}"));
    embed.color(WATCHLIST_COLOR);
    embed.description(truncate_for_embed(&lines.join("\n")));
    embed.footer(|f| f.text(watchlist_footer(items.len())));
    embed.timestamp(Timestamp::now());
    embed
}

/// Guild-level facts shown in the "Server" field of a whois card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberProfile {
    pub nickname: Option<String>,
    /// Unix seconds
    pub joined_at: Option<i64>,
    pub highest_role: Option<String>,
    /// Role ids, highest position first, `@everyone` excluded
    pub role_ids: Vec<u64>,
}

/// Everything a whois card shows about one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisProfile {
    pub user_id: u64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    /// Account creation, unix seconds
    pub created_at: i64,
    /// None when the user is not a member of the guild
    pub member: Option<MemberProfile>,
    pub requested_by: String,
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

/// Full date plus relative time, rendered in each viewer's own timezone
pub fn discord_time(unix: i64) -> String {
    format!("<t:{unix}:F> (<t:{unix}:R>)")
}

pub fn roles_text(role_ids: &[u64]) -> String {
    if role_ids.is_empty() {
        return PLACEHOLDER.to_string();
    }
    let mentions: Vec<String> = role_ids.iter().map(|id| format!("<@&{id}>")).collect();
    let joined = mentions.join(", ");
    if joined.chars().count() <= ROLE_LIST_CHARS || mentions.len() <= ROLE_LIST_CAP {
        return joined;
    }
    format!(
        "{}, +{} more",
        mentions[..ROLE_LIST_CAP].join(", "),
        mentions.len() - ROLE_LIST_CAP
    )
}

/// Body of the "User" field
pub fn user_summary(profile: &WhoisProfile, contact: Option<&Contact>) -> String {
    let global_name = contact.map(|c| c.global_name.as_str()).unwrap_or_default();
    let phone = contact.map(|c| c.phone.as_str()).unwrap_or_default();
    let address = contact.map(|c| c.address.as_str()).unwrap_or_default();
    format!(
        "Username: **{}**\nGlobal Name: **{}**\nPhone: **{}**\nAddress: **{}**\nCreated: {}",
        profile.username,
        or_placeholder(global_name),
        or_placeholder(phone),
        or_placeholder(address),
        discord_time(profile.created_at),
    )
}

/// Body of the "Server" field
pub fn server_summary(member: Option<&MemberProfile>) -> String {
    let Some(member) = member else {
        return "_User is not a member of this server._".to_string();
    };
    let joined = member
        .joined_at
        .map(discord_time)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        "Nickname: **{}**\nJoined: {}\nHighest Role: **{}**\nRoles: {}",
        or_placeholder(member.nickname.as_deref().unwrap_or_default()),
        joined,
        or_placeholder(member.highest_role.as_deref().unwrap_or_default()),
        roles_text(&member.role_ids),
    )
}

pub fn whois_embed(profile: &WhoisProfile, contact: Option<&Contact>) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.author(|a| {
        a.name(format!("WHOIS • {}", profile.username));
        if let Some(url) = &profile.avatar_url {
            a.icon_url(url);
        }
        a
    });
    if let Some(url) = &profile.avatar_url {
        embed.thumbnail(url);
    }
    embed.color(WHOIS_COLOR);
    embed.description(format!("<@{0}> • `{0}`", profile.user_id));
    embed.field("User", user_summary(profile, contact), false);
    embed.field("Server", server_summary(profile.member.as_ref()), false);
    embed.footer(|f| f.text(format!("Requested by {}", profile.requested_by)));
    embed.timestamp(Timestamp::now());
    if let Some(url) = &profile.banner_url {
        embed.image(url);
    }
    embed
}
