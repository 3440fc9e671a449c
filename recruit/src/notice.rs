//! Join notice templates.
//!
//! Both notices come out of one template: a list of body lines rendered twice,
//! once as HTML paragraphs and once as plain text, followed by a shared footer.

use crate::config::{BoardConfig, MailConfig};
use crate::providers::MailInfo;
use crate::state::{Contact, Position, RecruitSummary};

/// Which party a notice is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The board's creator, told that someone joined.
    Organizer,
    /// The joining member, told that the join is confirmed.
    Joiner,
}

impl NoticeKind {
    /// Name used in log fields and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Joiner => "joiner",
        }
    }

    /// Subject line.
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::Organizer => "【GuildHack】募集中ボードに参加メンバー追加の通知",
            Self::Joiner => "【GuildHack】参加完了の通知",
        }
    }
}

/// Everything a notice interpolates.
#[derive(Debug, Clone, Copy)]
pub struct NoticeData<'a> {
    /// Board the member joined, as resolved after the append.
    pub recruit: &'a RecruitSummary,
    /// Who receives the notice.
    pub recipient: &'a Contact,
    /// Role the new member took.
    pub position: &'a Position,
}

impl NoticeData<'_> {
    /// How many members joined besides the creator.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.recruit.members.len().saturating_sub(1)
    }
}

enum Line {
    Text(String),
    Link(String),
    Break,
}

fn body_lines(kind: NoticeKind, data: &NoticeData<'_>, board: &BoardConfig, mail: &MailConfig) -> Vec<Line> {
    let recruit = data.recruit;
    let label = data.position.label();

    let mut lines = vec![Line::Text(format!(
        "{}さん、こんにちは！ {}運営事務局です。",
        data.recipient.name, mail.sender_name
    ))];

    lines.push(Line::Text(match kind {
        NoticeKind::Organizer => format!(
            "タイトル : {}のボードに{label}で{}人目のメンバーが参加しました。",
            recruit.title,
            data.ordinal()
        ),
        NoticeKind::Joiner => format!(
            "タイトル : {}（{}からの{}日間）に{label}として参加が確定しました。",
            recruit.title,
            recruit.event_day.as_deref().unwrap_or_default(),
            recruit.day.as_deref().unwrap_or_default()
        ),
    }));

    lines.push(Line::Text("以下のURLをクリックし、確認してください。".to_string()));
    lines.push(Line::Link(board.board_url(recruit.id)));
    lines.push(Line::Break);

    if kind == NoticeKind::Joiner {
        lines.push(Line::Text(
            "コミュニケーションツールへの招待は以下のURLになります。".to_string(),
        ));
        lines.push(Line::Link(recruit.slack_url.clone().unwrap_or_default()));
        lines.push(Line::Break);
    }

    lines.extend(footer_lines(board, mail));
    lines
}

fn footer_lines(board: &BoardConfig, mail: &MailConfig) -> [Line; 8] {
    let rule = || Line::Text("---------------------------".to_string());
    [
        Line::Text("※イベント参加時のトラブルの責任は一切おいかねますので、ご了承ください。".to_string()),
        Line::Text(
            "※連絡のない当日不参加が繰り返される場合、退会とさせていただくことがありますので、ご了承ください。"
                .to_string(),
        ),
        Line::Text("※本メールアドレスは送信専用のため、返信できません。".to_string()),
        rule(),
        Line::Text(format!("{}運営事務局", mail.sender_name)),
        Line::Text(format!("Mail : {}", mail.support_address)),
        Line::Link(board.site_url()),
        rule(),
    ]
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn to_html(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| match line {
            Line::Text(text) => format!("<p>{}</p>", escape_html(text)),
            Line::Link(url) => {
                let url = escape_html(url);
                format!("<p><a href='{url}'>{url}</a></p>")
            },
            Line::Break => "<br>".to_string(),
        })
        .collect()
}

fn to_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| match line {
            Line::Text(text) | Line::Link(text) => text.as_str(),
            Line::Break => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a notice for its recipient.
///
/// Pure: the same inputs always give the same message.
#[must_use]
pub fn render_notice(
    kind: NoticeKind,
    data: &NoticeData<'_>,
    board: &BoardConfig,
    mail: &MailConfig,
) -> MailInfo {
    let lines = body_lines(kind, data, board, mail);

    MailInfo {
        sender: mail.sender(),
        recipient: data.recipient.email.clone(),
        subject: kind.subject().to_string(),
        html_body: to_html(&lines),
        text_body: to_text(&lines),
        charset: mail.charset.clone(),
    }
}
