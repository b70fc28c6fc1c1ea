use super::{SearchClient, SearchError, SearchResult};
use crate::shell::CommandRunner;
use crate::ui::{Console, Tone};
use tracing::{info, warn};

pub const MOVIE_SITES: &[&str] = &[
    "vidsrc.to",
    "vidplay.net",
    "123moviesfree.net",
    "fmovies.to",
    "goku.sx",
    "cloudstream",
    "cineb.rs",
    "flixhq.to",
    "myflixer",
    "soap2day",
    "gdriveplayer.to",
    "tinyzone",
];

pub const LIVE_STREAM_SITES: &[&str] = &[
    "youtube.com",
    "twitch.tv",
    "m3u8",
    "stream",
    "embed",
    "dailymotion.com",
    "streamsb.net",
    "watchsport.live",
];

const MOVIE_TERMS: &[&str] = &["full movie", "watch", "download", "film"];
const LIVE_TERMS: &[&str] = &["live", "livestream", "match", "game", "event"];

/// Raw results considered before filtering
const STREAM_CANDIDATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Movie,
    Live,
    /// Neither or both kinds of term; any known site qualifies
    Any,
}

impl StreamKind {
    pub fn accepts(self, url: &str) -> bool {
        let on = |sites: &[&str]| sites.iter().any(|site| url.contains(site));
        match self {
            StreamKind::Movie => on(MOVIE_SITES),
            StreamKind::Live => on(LIVE_STREAM_SITES),
            StreamKind::Any => on(MOVIE_SITES) || on(LIVE_STREAM_SITES),
        }
    }
}

pub fn classify_query(query: &str) -> StreamKind {
    let lower = query.to_lowercase();
    let movie = MOVIE_TERMS.iter().any(|term| lower.contains(term));
    let live = LIVE_TERMS.iter().any(|term| lower.contains(term));

    match (movie, live) {
        (true, false) => StreamKind::Movie,
        (false, true) => StreamKind::Live,
        _ => StreamKind::Any,
    }
}

pub fn filter_streams(results: Vec<SearchResult>, kind: StreamKind) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| kind.accepts(&result.url))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Mpv,
    Vlc,
    Browser,
}

impl Player {
    pub fn label(self) -> &'static str {
        match self {
            Player::Mpv => "MPV",
            Player::Vlc => "VLC",
            Player::Browser => "BROWSER",
        }
    }

    /// Program and arguments that open `url` in this player
    pub fn command(self, url: &str) -> (&'static str, Vec<String>) {
        let program = match self {
            Player::Mpv => "mpv",
            Player::Vlc => "vlc",
            Player::Browser if cfg!(target_os = "macos") => "open",
            Player::Browser => "xdg-open",
        };
        (program, vec![url.to_string()])
    }
}

/// mpv and vlc when installed, then the browser
pub fn detect_players() -> Vec<Player> {
    let mut players: Vec<Player> = [(Player::Mpv, "mpv"), (Player::Vlc, "vlc")]
        .into_iter()
        .filter(|(_, binary)| which::which(binary).is_ok())
        .map(|(player, _)| player)
        .collect();
    players.push(Player::Browser);
    players
}

/// 1-based pick from `players`; anything unusable means the first one
pub fn choose_player(answer: &str, players: &[Player]) -> Option<Player> {
    let index = answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=players.len()).contains(n))
        .unwrap_or(1);
    players.get(index - 1).copied()
}

/// Find a stream for `query`, show the first hit and play it on request.
/// Returns the player used, if any.
pub async fn handle_stream(
    console: &mut dyn Console,
    client: &SearchClient,
    runner: &dyn CommandRunner,
    players: &[Player],
    query: &str,
) -> Result<Option<Player>, SearchError> {
    console.say(&format!("Searching for stream: {}", query));

    let kind = classify_query(query);
    let streams = filter_streams(client.search(query, STREAM_CANDIDATES).await?, kind);

    let Some(stream) = streams.first() else {
        console.show(Tone::Error, "No streamable links found.");
        return Ok(None);
    };

    console.show(Tone::Success, &format!("Found stream: {}", stream.title));
    console.say(&format!("Link: {}", stream.url));

    let confirmed = matches!(
        console.read_line("Do you want to play this stream? (y/n): "),
        Ok(Some(answer)) if answer.trim().to_lowercase() == "y"
    );
    if !confirmed {
        console.show(Tone::Warning, "Skipped.");
        return Ok(None);
    }

    console.say("Choose a player:");
    for (idx, player) in players.iter().enumerate() {
        console.say(&format!("{}. {}", idx + 1, player.label()));
    }
    let answer = console
        .read_line("Enter number (default 1): ")
        .ok()
        .flatten()
        .unwrap_or_default();

    let Some(player) = choose_player(&answer, players) else {
        return Ok(None);
    };

    info!(player = player.label(), url = %stream.url, "launching stream");
    console.say(&format!("Launching with {}...", player.label()));

    let (program, args) = player.command(&stream.url);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    if let Err(err) = runner.launch(program, &args) {
        warn!(error = %err, "player launch failed");
        console.show(Tone::Error, &format!("Failed to launch stream: {}", err));
    }

    Ok(Some(player))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str) -> SearchResult {
        SearchResult {
            title: url.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_classify_query() {
        assert_eq!(classify_query("Inception full movie"), StreamKind::Movie);
        assert_eq!(classify_query("Champions League LIVE"), StreamKind::Live);
        assert_eq!(classify_query("watch the game"), StreamKind::Any);
        assert_eq!(classify_query("lofi beats"), StreamKind::Any);
    }

    #[test]
    fn test_filter_streams_by_kind() {
        let results = vec![
            result("https://vidsrc.to/embed/movie/1"),
            result("https://www.twitch.tv/somebody"),
            result("https://en.wikipedia.org/wiki/Inception"),
        ];

        let movies = filter_streams(results.clone(), StreamKind::Movie);
        assert_eq!(movies.len(), 1);
        assert!(movies[0].url.contains("vidsrc.to"));

        let live = filter_streams(results.clone(), StreamKind::Live);
        // vidsrc's /embed/ path counts as a live site too
        assert_eq!(live.len(), 2);

        let any = filter_streams(results, StreamKind::Any);
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn test_choose_player() {
        let players = [Player::Mpv, Player::Vlc, Player::Browser];
        assert_eq!(choose_player("2", &players), Some(Player::Vlc));
        assert_eq!(choose_player("", &players), Some(Player::Mpv));
        assert_eq!(choose_player("9", &players), Some(Player::Mpv));
        assert_eq!(choose_player("abc", &players), Some(Player::Mpv));
        assert_eq!(choose_player("1", &[]), None);
    }

    #[test]
    fn test_detect_players_always_has_browser() {
        assert_eq!(detect_players().last(), Some(&Player::Browser));
    }

    #[test]
    fn test_player_command() {
        let (program, args) = Player::Mpv.command("https://twitch.tv/x");
        assert_eq!(program, "mpv");
        assert_eq!(args, vec!["https://twitch.tv/x"]);
    }
}
