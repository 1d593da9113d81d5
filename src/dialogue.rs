//! Account-opening dialogue state machine
//!
//! A strictly sequential six-step flow collecting account type, name,
//! ID number, phone and a final confirmation. Every transition takes
//! one line of user text and returns the reply; invalid input re-prompts
//! without advancing. The machine never errors.

use tracing::{debug, info};

/// Keywords that, together with an open/create keyword, start the flow.
const ACCOUNT_KEYWORDS: &[&str] = &["account", "ანგარიში"];

/// Open/create keywords, English and Georgian (with transliterations).
const OPEN_KEYWORDS: &[&str] = &[
    "open", "create", "register",
    "გახსნა", "შექმნა", "დარეგისტრირება",
    "gakhsna", "shekmna",
];

const YES_TOKENS: &[&str] = &[
    "yes", "y", "ok", "ki", "qi",
    "დიახ", "კი", "კარგი", "ხოოო",
];

const NO_TOKENS: &[&str] = &["no", "n", "ara", "არა", "ნო"];

/// The three openable account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Salary,
    Business,
    MultiCurrency,
}

impl AccountType {
    pub fn label(self) -> &'static str {
        match self {
            AccountType::Salary => "Salary account",
            AccountType::Business => "Business account",
            AccountType::MultiCurrency => "Multi-currency account (USD, EUR)",
        }
    }

    /// Map a numeric choice or a keyword synonym (either language) to a type.
    fn from_input(input: &str) -> Option<Self> {
        let contains_any =
            |keywords: &[&str]| keywords.iter().any(|k| input.contains(k));

        match input {
            "1" => return Some(AccountType::Salary),
            "2" => return Some(AccountType::Business),
            "3" => return Some(AccountType::MultiCurrency),
            _ => {}
        }

        if contains_any(&["სახელფასო", "salary", "sakhelfaso"]) {
            Some(AccountType::Salary)
        } else if contains_any(&["ბიზნეს", "business", "biznes"]) {
            Some(AccountType::Business)
        } else if contains_any(&["სავალუტო", "currency", "valuta", "usd", "eur"]) {
            Some(AccountType::MultiCurrency)
        } else {
            None
        }
    }
}

/// Flow position. `Idle` and `Complete` are both idle with respect to
/// the flow; `Complete` only exists to emit one closing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DialogueStep {
    Idle,
    SelectAccountType,
    CollectName,
    CollectId,
    CollectPhone,
    Confirm,
    Complete,
}

impl DialogueStep {
    /// Step index 0-6.
    pub fn number(self) -> u8 {
        match self {
            DialogueStep::Idle => 0,
            DialogueStep::SelectAccountType => 1,
            DialogueStep::CollectName => 2,
            DialogueStep::CollectId => 3,
            DialogueStep::CollectPhone => 4,
            DialogueStep::Confirm => 5,
            DialogueStep::Complete => 6,
        }
    }
}

/// Fields collected during the flow. Each field is written exactly once,
/// by the step that collects it.
#[derive(Debug, Clone, Default)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub phone: Option<String>,
}

/// One account-opening session, owned by the single conversation loop.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    step: DialogueStep,
    account_type: Option<AccountType>,
    personal: PersonalInfo,
}

impl DialogueSession {
    pub fn new() -> Self {
        Self {
            step: DialogueStep::Idle,
            account_type: None,
            personal: PersonalInfo::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.step != DialogueStep::Idle
    }

    pub fn step(&self) -> DialogueStep {
        self.step
    }

    pub fn account_type(&self) -> Option<AccountType> {
        self.account_type
    }

    pub fn personal(&self) -> &PersonalInfo {
        &self.personal
    }

    /// Start the flow when an idle session sees an account keyword
    /// together with an open/create keyword. Returns the account-type
    /// menu on success.
    pub fn try_open(&mut self, input: &str) -> Option<String> {
        if self.is_active() {
            return None;
        }

        let lowered = input.to_lowercase();
        let has_account = ACCOUNT_KEYWORDS.iter().any(|k| lowered.contains(k));
        let has_open = OPEN_KEYWORDS.iter().any(|k| lowered.contains(k));

        if !(has_account && has_open) {
            return None;
        }

        info!("Account-opening flow started");
        self.step = DialogueStep::SelectAccountType;

        Some(
            "I can help you open an account. Which type would you like?\n\
             Reply with a number or the account type name:\n\
             1. Salary account\n\
             2. Business account\n\
             3. Multi-currency account (USD, EUR)"
                .to_string(),
        )
    }

    /// Advance the flow with one line of user input. Returns `None` when
    /// the session is idle (input falls outside the flow).
    pub fn handle(&mut self, input: &str) -> Option<String> {
        let reply = match self.step {
            DialogueStep::Idle => return None,
            DialogueStep::SelectAccountType => self.select_account_type(input),
            DialogueStep::CollectName => self.collect_name(input),
            DialogueStep::CollectId => self.collect_id(input),
            DialogueStep::CollectPhone => self.collect_phone(input),
            DialogueStep::Confirm => self.confirm(input),
            DialogueStep::Complete => {
                self.reset();
                "How else can I help you?".to_string()
            }
        };

        debug!(step = self.step.number(), "Dialogue step handled");
        Some(reply)
    }

    fn select_account_type(&mut self, input: &str) -> String {
        let cleaned = input.trim().to_lowercase();

        match AccountType::from_input(&cleaned) {
            Some(account_type) => {
                self.account_type = Some(account_type);
                self.step = DialogueStep::CollectName;
                format!(
                    "You chose: {}. Now please tell me your first and last name:",
                    account_type.label()
                )
            }
            None => "Please choose 1, 2 or 3, or type the account type \
                     (salary, business, multi-currency):"
                .to_string(),
        }
    }

    fn collect_name(&mut self, input: &str) -> String {
        let cleaned = input.trim();

        if cleaned.split_whitespace().count() >= 2 && cleaned.len() >= 4 {
            self.personal.name = Some(cleaned.to_string());
            self.step = DialogueStep::CollectId;
            "Please enter your ID number:".to_string()
        } else {
            "Please enter your full first and last name:".to_string()
        }
    }

    fn collect_id(&mut self, input: &str) -> String {
        let cleaned = strip_separators(input, &[' ', '-', '_']);

        if cleaned.len() >= 9 && cleaned.chars().all(|c| c.is_ascii_digit()) {
            self.personal.id_number = Some(cleaned);
            self.step = DialogueStep::CollectPhone;
            "Please enter your phone number:".to_string()
        } else {
            "That doesn't look right. Please enter a valid ID number \
             (at least 9 digits):"
                .to_string()
        }
    }

    fn collect_phone(&mut self, input: &str) -> String {
        let cleaned = strip_separators(input, &[' ', '-', '(', ')', '+']);

        if cleaned.len() >= 9 && cleaned.chars().all(|c| c.is_ascii_digit()) {
            self.personal.phone = Some(cleaned);
            self.step = DialogueStep::Confirm;
            self.summary()
        } else {
            "Please enter a valid phone number (at least 9 digits):".to_string()
        }
    }

    fn confirm(&mut self, input: &str) -> String {
        let cleaned = input.trim().to_lowercase();

        if YES_TOKENS.contains(&cleaned.as_str()) {
            self.step = DialogueStep::Complete;
            info!("Account-opening flow confirmed");
            "Thank you! 🎉 Our staff will contact you within 24 hours \
             to finalize the details."
                .to_string()
        } else if NO_TOKENS.contains(&cleaned.as_str()) {
            info!("Account-opening flow cancelled");
            self.reset();
            "Alright, the account opening has been cancelled.".to_string()
        } else {
            "Please answer 'yes' or 'no':".to_string()
        }
    }

    fn summary(&self) -> String {
        let account_type = self
            .account_type
            .map(AccountType::label)
            .unwrap_or("unknown");

        format!(
            "📋 Account opening summary:\n\
             🏦 Account type: {}\n\
             👤 Name: {}\n\
             🆔 ID number: {}\n\
             📱 Phone: {}\n\n\
             Would you like to continue? (reply \"yes\" or \"no\")",
            account_type,
            self.personal.name.as_deref().unwrap_or(""),
            self.personal.id_number.as_deref().unwrap_or(""),
            self.personal.phone.as_deref().unwrap_or(""),
        )
    }

    fn reset(&mut self) {
        self.step = DialogueStep::Idle;
        self.account_type = None;
        self.personal = PersonalInfo::default();
    }
}

impl Default for DialogueSession {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_separators(input: &str, separators: &[char]) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !separators.contains(c))
        .collect()
}
