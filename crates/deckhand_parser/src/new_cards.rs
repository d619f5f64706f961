//! Card-list parsing.
//!
//! A card list is a sequence of entries `(<digits>#)?<name><description>`
//! where the description is wrapped in one of three bracket styles:
//! `「…」`, `『…』` or `【…】`. The opening run may repeat the same symbol
//! (`【【x】】`) as long as the closing run matches it. Reserved characters
//! are escaped with `\`.
//!
//! The parser is a single pass over the characters driven by [`State`].
//! Every state names exactly what it has collected so far.

use deckhand_foundation::{MAX_AMOUNT, NewCard};

/// Characters that may follow `\`.
pub const ESCAPABLE: &str = "「」『』【】#\\";

/// One of the three interchangeable description brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bracket {
    /// `「」`
    Corner,
    /// `『』`
    WhiteCorner,
    /// `【】`
    Lenticular,
}

impl Bracket {
    /// All bracket styles.
    pub const ALL: [Self; 3] = [Self::Corner, Self::WhiteCorner, Self::Lenticular];

    /// The opening symbol.
    #[must_use]
    pub const fn open(self) -> char {
        match self {
            Self::Corner => '「',
            Self::WhiteCorner => '『',
            Self::Lenticular => '【',
        }
    }

    /// The closing symbol.
    #[must_use]
    pub const fn close(self) -> char {
        match self {
            Self::Corner => '」',
            Self::WhiteCorner => '』',
            Self::Lenticular => '】',
        }
    }

    fn from_open(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.open() == c)
    }

    fn from_close(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.close() == c)
    }
}

/// How the current character reads in the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharKind {
    Eof,
    /// An unescaped `\`.
    Escape,
    /// A reserved character that followed `\`.
    Escaped,
    /// `\` followed by something that cannot be escaped.
    BadEscape,
    Space,
    Open(Bracket),
    Close(Bracket),
    /// A bracket symbol of a different style inside a description.
    Foreign,
    Normal,
}

fn classify(c: Option<char>, escaping: bool, inside: Option<Bracket>) -> CharKind {
    let Some(c) = c else {
        return if escaping {
            CharKind::BadEscape
        } else {
            CharKind::Eof
        };
    };
    if escaping {
        return if ESCAPABLE.contains(c) {
            CharKind::Escaped
        } else {
            CharKind::BadEscape
        };
    }
    if c == '\\' {
        return CharKind::Escape;
    }
    if c.is_whitespace() {
        return CharKind::Space;
    }
    match (inside, Bracket::from_open(c), Bracket::from_close(c)) {
        (None, Some(b), _) => CharKind::Open(b),
        // Close symbols outside a description are ordinary name characters.
        (None, None, _) => CharKind::Normal,
        (Some(cur), Some(b), _) if b == cur => CharKind::Open(b),
        (Some(cur), _, Some(b)) if b == cur => CharKind::Close(b),
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => CharKind::Foreign,
        (Some(_), None, None) => CharKind::Normal,
    }
}

/// Parser position within the current card.
#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    /// Start, or right after a closed description.
    AmountOrName,
    /// Inside a leading digit run.
    AmountOrHash { digits: String },
    /// Right after `<digits>#`.
    Name { amount: Option<u64> },
    /// Inside a name.
    NameOrOpen { amount: Option<u64>, name: String },
    /// Whitespace ended the name; only an opening bracket may follow.
    Open { amount: Option<u64>, name: String },
    /// Inside the opening run.
    OpenOrDescOrClose {
        amount: Option<u64>,
        name: String,
        bracket: Bracket,
        depth: usize,
    },
    /// Inside the description.
    DescOrClose {
        amount: Option<u64>,
        name: String,
        bracket: Bracket,
        depth: usize,
        desc: String,
    },
    /// Inside the closing run.
    Close {
        amount: Option<u64>,
        name: String,
        bracket: Bracket,
        desc: String,
        remaining: usize,
    },
}

impl State {
    fn bracket(&self) -> Option<Bracket> {
        match self {
            Self::OpenOrDescOrClose { bracket, .. }
            | Self::DescOrClose { bracket, .. }
            | Self::Close { bracket, .. } => Some(*bracket),
            _ => None,
        }
    }

    fn partial_name(&self) -> Option<&str> {
        match self {
            Self::NameOrOpen { name, .. }
            | Self::Open { name, .. }
            | Self::OpenOrDescOrClose { name, .. }
            | Self::DescOrClose { name, .. }
            | Self::Close { name, .. } => Some(name),
            _ => None,
        }
    }

    fn expected(&self) -> String {
        match self {
            Self::AmountOrName => "数量或卡名".to_string(),
            Self::AmountOrHash { .. } => "数量的后续或 “#”".to_string(),
            Self::Name { .. } => "卡名".to_string(),
            Self::NameOrOpen { .. } => "卡名或包围描述前侧的符号".to_string(),
            Self::Open { .. } => "包围描述前侧的符号".to_string(),
            Self::OpenOrDescOrClose { bracket, .. } => format!(
                "“{}”、描述或 “{}”",
                bracket.open(),
                bracket.close()
            ),
            Self::DescOrClose { bracket, .. } => format!("描述或 “{}”", bracket.close()),
            Self::Close { bracket, .. } => format!("“{}”", bracket.close()),
        }
    }
}

struct CardListParser {
    cards: Vec<NewCard>,
    state: State,
}

impl CardListParser {
    fn location(&self) -> String {
        if let Some(name) = self.state.partial_name() {
            return format!("解析第 {} 张卡牌 “{name}” 途中", self.cards.len() + 1);
        }
        match self.cards.last() {
            None => "起始位置后".to_string(),
            Some(card) => format!("第 {} 张卡牌 “{}” 之后", self.cards.len(), card.name),
        }
    }

    fn unexpected(&self, actual: Option<char>) -> String {
        let actual = actual.map_or_else(|| "文本结束".to_string(), |c| format!("“{c}”"));
        format!(
            "于{}：期待{}，实际遇到{actual}",
            self.location(),
            self.state.expected()
        )
    }

    fn finish_card(&mut self, amount: Option<u64>, name: String, desc: &str) {
        self.cards
            .push(NewCard::new(name, amount, desc.trim().to_string()));
        self.state = State::AmountOrName;
    }

    /// Feeds one character (`None` for end of input).
    ///
    /// Returns `Ok(true)` when the next character is escaped.
    #[allow(clippy::too_many_lines)]
    fn step(&mut self, c: Option<char>, kind: CharKind) -> Result<bool, String> {
        let state = std::mem::replace(&mut self.state, State::AmountOrName);
        let mut escape_next = false;
        let next = match (state, kind) {
            (State::AmountOrName, CharKind::Eof) => State::AmountOrName,
            (State::AmountOrName, CharKind::Escape) => {
                escape_next = true;
                State::AmountOrName
            }
            (State::AmountOrName, CharKind::Space) => State::AmountOrName,
            (State::AmountOrName, CharKind::Normal) if c == Some('#') => {
                self.state = State::AmountOrName;
                return Err(self.unexpected(c));
            }
            (State::AmountOrName, CharKind::Normal | CharKind::Escaped) => {
                let c = c.unwrap_or_default();
                if kind == CharKind::Normal && c.is_ascii_digit() {
                    State::AmountOrHash {
                        digits: c.to_string(),
                    }
                } else {
                    State::NameOrOpen {
                        amount: None,
                        name: c.to_string(),
                    }
                }
            }

            (State::AmountOrHash { mut digits }, CharKind::Normal) => {
                let c = c.unwrap_or_default();
                if c.is_ascii_digit() {
                    digits.push(c);
                    State::AmountOrHash { digits }
                } else if c == '#' {
                    match digits.parse::<u64>() {
                        Ok(n) if n <= MAX_AMOUNT => State::Name { amount: Some(n) },
                        _ => {
                            self.state = State::AmountOrHash { digits };
                            return Err(format!("于{}：数量过大", self.location()));
                        }
                    }
                } else {
                    // The digits were the start of a name after all.
                    digits.push(c);
                    State::NameOrOpen {
                        amount: None,
                        name: digits,
                    }
                }
            }
            (State::AmountOrHash { digits }, CharKind::Escape) => {
                escape_next = true;
                State::NameOrOpen {
                    amount: None,
                    name: digits,
                }
            }
            (State::AmountOrHash { digits }, CharKind::Open(bracket)) => {
                State::OpenOrDescOrClose {
                    amount: None,
                    name: digits,
                    bracket,
                    depth: 1,
                }
            }

            (State::Name { amount }, CharKind::Escape) => {
                escape_next = true;
                State::Name { amount }
            }
            (State::Name { amount }, CharKind::Normal | CharKind::Escaped)
                if !(kind == CharKind::Normal && c == Some('#')) =>
            {
                State::NameOrOpen {
                    amount,
                    name: c.unwrap_or_default().to_string(),
                }
            }

            (State::NameOrOpen { amount, name }, CharKind::Escape) => {
                escape_next = true;
                State::NameOrOpen { amount, name }
            }
            (State::NameOrOpen { amount, mut name }, CharKind::Normal | CharKind::Escaped) => {
                name.push(c.unwrap_or_default());
                State::NameOrOpen { amount, name }
            }
            (State::NameOrOpen { amount, name }, CharKind::Space) => State::Open { amount, name },
            (
                State::NameOrOpen { amount, name } | State::Open { amount, name },
                CharKind::Open(bracket),
            ) => State::OpenOrDescOrClose {
                amount,
                name,
                bracket,
                depth: 1,
            },
            (State::Open { amount, name }, CharKind::Space) => State::Open { amount, name },

            (
                State::OpenOrDescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                },
                CharKind::Open(_),
            ) => State::OpenOrDescOrClose {
                amount,
                name,
                bracket,
                depth: depth + 1,
            },
            (
                State::OpenOrDescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                },
                CharKind::Escape,
            ) => {
                escape_next = true;
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    desc: String::new(),
                }
            }
            (
                State::OpenOrDescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                },
                CharKind::Space | CharKind::Normal | CharKind::Escaped,
            ) => State::DescOrClose {
                amount,
                name,
                bracket,
                depth,
                desc: c.unwrap_or_default().to_string(),
            },
            (
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    desc,
                },
                CharKind::Escape,
            ) => {
                escape_next = true;
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    desc,
                }
            }
            (
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    mut desc,
                },
                CharKind::Space | CharKind::Normal | CharKind::Escaped,
            ) => {
                desc.push(c.unwrap_or_default());
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    desc,
                }
            }
            (
                State::OpenOrDescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                },
                CharKind::Close(_),
            ) => self.close(amount, name, bracket, String::new(), depth),
            (
                State::DescOrClose {
                    amount,
                    name,
                    bracket,
                    depth,
                    desc,
                },
                CharKind::Close(_),
            ) => self.close(amount, name, bracket, desc, depth),
            (
                State::Close {
                    amount,
                    name,
                    bracket,
                    desc,
                    remaining,
                },
                CharKind::Close(_),
            ) => self.close(amount, name, bracket, desc, remaining),

            (state, _) => {
                self.state = state;
                return Err(self.unexpected(c));
            }
        };
        self.state = next;
        Ok(escape_next)
    }

    /// Consumes one closing symbol; `remaining` counts it.
    fn close(
        &mut self,
        amount: Option<u64>,
        name: String,
        bracket: Bracket,
        desc: String,
        remaining: usize,
    ) -> State {
        if remaining > 1 {
            State::Close {
                amount,
                name,
                bracket,
                desc,
                remaining: remaining - 1,
            }
        } else {
            self.finish_card(amount, name, &desc);
            State::AmountOrName
        }
    }
}

/// Parses a card list such as `愚者「」3#恋人【两人】`.
///
/// # Errors
///
/// Returns a message naming the position (after card N, or mid-card with
/// the partial name) and what was expected instead.
pub fn parse_new_cards(text: &str) -> Result<Vec<NewCard>, String> {
    let mut parser = CardListParser {
        cards: Vec::new(),
        state: State::AmountOrName,
    };
    let mut escaping = false;

    for c in text.chars().map(Some).chain(std::iter::once(None)) {
        let kind = classify(c, escaping, parser.state.bracket());
        if kind == CharKind::BadEscape {
            let detail = match c {
                None => "“\\” 不能是最后一个字符。".to_string(),
                Some(c) => format!("目前 “\\” 只能用于转义 “{ESCAPABLE}”，其后不能跟随 “{c}”。"),
            };
            return Err(format!("于{}：{detail}", parser.location()));
        }
        escaping = parser.step(c, kind)?;
    }

    Ok(parser.cards)
}

/// Writes a card back in the form [`parse_new_cards`] accepts.
#[must_use]
pub fn render_new_card(card: &NewCard, bracket: Bracket) -> String {
    let mut out = String::new();
    if let Some(amount) = card.amount {
        out.push_str(&amount.to_string());
        out.push('#');
    }
    push_escaped(&mut out, card.name.as_str());
    out.push(bracket.open());
    push_escaped(&mut out, &card.description);
    out.push(bracket.close());
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if ESCAPABLE.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
}
