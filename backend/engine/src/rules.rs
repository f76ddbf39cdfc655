//! Rule-based fallback engine.
//!
//! Free text is matched against an ordered list of intent patterns; the first
//! match wins, so list order is priority. Every intent maps to one fixed reply.

use std::fmt;
use std::str::FromStr;

use folio_core::{Action, ThemeMode};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CONTACT_EMAIL: &str = "lukasnilssonbusiness@gmail.com";
pub const LINKEDIN_URL: &str = "https://www.linkedin.com/in/lukaspnilsson/";
pub const RESUME_PATH: &str = "assets/resume.pdf";
pub const RESUME_FILENAME: &str = "Lukas_Nilsson_Resume.pdf";

const GENERIC_REPLY: &str = "I'd be happy to help! You can ask me about my projects, skills, availability, or how to get in touch. Try clicking one of the shortcuts below.";

const GREETINGS: [&str; 3] = [
    "Hi! I'm here to help you learn about Lukas's work and projects. What would you like to know?",
    "Hello! Ask me about projects, skills, availability, or anything else about Lukas's portfolio.",
    "Hey there! I can tell you about Lukas's work, help you navigate the site, or answer questions about his experience.",
];

/// A recognised visitor intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Projects,
    Resume,
    Skills,
    Contact,
    Linkedin,
    Availability,
    About,
    Name,
    Location,
    Theme,
}

impl Intent {
    /// All intents in matching priority order.
    pub const ALL: [Intent; 10] = [
        Intent::Projects,
        Intent::Resume,
        Intent::Skills,
        Intent::Contact,
        Intent::Linkedin,
        Intent::Availability,
        Intent::About,
        Intent::Name,
        Intent::Location,
        Intent::Theme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Projects => "projects",
            Intent::Resume => "resume",
            Intent::Skills => "skills",
            Intent::Contact => "contact",
            Intent::Linkedin => "linkedin",
            Intent::Availability => "availability",
            Intent::About => "about",
            Intent::Name => "name",
            Intent::Location => "location",
            Intent::Theme => "theme",
        }
    }

    /// The keyword pattern backing this intent.
    pub fn pattern(&self) -> &'static str {
        match self {
            Intent::Projects => {
                r"projects?|work|portfolio|case|studies?|examples?|show|what.*built|what.*created"
            }
            Intent::Resume => r"resume|cv|download|pdf|experience|background|career|history",
            Intent::Skills => {
                r"skills?|stack|tools?|technologies?|languages?|frameworks?|what.*know|expertise"
            }
            Intent::Contact => r"contact|email|reach|get.*touch|hire|available|message|talk",
            Intent::Linkedin => r"linkedin|linked.*in|social|profile|connect",
            Intent::Availability => {
                r"available|hire|freelance|contract|work.*with|collaborate|pricing|rate|cost"
            }
            Intent::About => r"about|who.*are|story|background|person|philosophy|approach",
            Intent::Name => r"name|last.*name|nilsson|what.*your.*name|who.*are.*you",
            Intent::Location => r"location|where|timezone|based|live|remote",
            Intent::Theme => r"theme|dark|light|mode|color|appearance",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| format!("unknown intent `{s}`"))
    }
}

static INTENT_PATTERNS: Lazy<Vec<(Intent, Regex)>> = Lazy::new(|| {
    Intent::ALL
        .into_iter()
        .map(|intent| (intent, Regex::new(intent.pattern()).unwrap()))
        .collect()
});

/// A canned response bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub actions: Vec<Action>,
}

impl Reply {
    fn new(text: &str, actions: Vec<Action>) -> Self {
        Self {
            text: text.to_string(),
            actions,
        }
    }
}

/// Map free text to the first intent whose pattern matches.
pub fn classify(text: &str) -> Option<Intent> {
    let text = text.trim().to_lowercase();
    INTENT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&text))
        .map(|(intent, _)| *intent)
}

/// Classify and answer in one step.
pub fn reply(text: &str) -> Reply {
    respond(classify(text))
}

/// Fixed reply for an intent; `None` yields the generic help text with no actions.
pub fn respond(intent: Option<Intent>) -> Reply {
    let Some(intent) = intent else {
        return Reply::new(GENERIC_REPLY, Vec::new());
    };

    match intent {
        Intent::Projects => Reply::new(
            "Here are some of my key projects:\n\n\
             • **ANZ Plus Digital Platform** - Led design and development of next-generation mobile banking platform, improving user engagement by 40%\n\n\
             • **The Human Archives** - Created an interactive platform to preserve and share cultural stories, connecting communities with their heritage\n\n\
             • **Pachaayni Experience** - Designed an immersive cultural education platform that brings indigenous wisdom to modern audiences\n\n\
             • **Design System Library** - Developed a comprehensive design system reducing design-to-dev handoff time by 60%\n\n\
             You can scroll to the Work section to see more details, or ask about a specific project!",
            vec![Action::jump("#work", "View Work Section")],
        ),
        Intent::Resume => Reply::new(
            "You can download my resume in PDF format. It includes my complete work history, skills, and experience at ANZ, The Human Archives, and other projects.",
            vec![Action::download_as(RESUME_PATH, "Download Resume", RESUME_FILENAME)],
        ),
        Intent::Skills => Reply::new(
            "My core skills include:\n\n\
             **Design:**\n• Figma, Adobe XD, Prototyping, User Research\n\n\
             **Development:**\n• HTML/CSS/JS, React, Python, Swift\n\n\
             **Tools:**\n• Git/GitHub, Jira/Confluence, Analytics, AEM\n\n\
             I specialize in creating elegant digital experiences that blend creativity with technical expertise. I'm particularly passionate about fintech platforms and cultural preservation initiatives.",
            vec![Action::jump("#about", "Learn More About Me")],
        ),
        Intent::Contact => Reply::new(
            "I'd love to hear from you! You can reach me directly at lukasnilssonbusiness@gmail.com or connect with me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/. I'm always interested in discussing new opportunities, collaborations, or just having a chat about design and technology.",
            vec![
                Action::email(CONTACT_EMAIL, "Send Email"),
                Action::link(LINKEDIN_URL, "Connect on LinkedIn"),
                Action::jump("#contact", "Contact Form"),
            ],
        ),
        Intent::Linkedin => Reply::new(
            "You can find me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/ where I share updates about my work in product design and development. I'm always happy to connect with fellow designers, developers, and anyone interested in creating meaningful digital experiences!",
            vec![Action::link(LINKEDIN_URL, "Connect on LinkedIn")],
        ),
        Intent::Availability => Reply::new(
            "I'm currently available for new projects and opportunities! I work on both freelance and full-time projects, with a focus on product design and development.\n\n\
             I'm based in Melbourne and can work remotely or on-site. For project inquiries, please reach out via email and I'll get back to you within 24 hours.",
            vec![
                Action::email(CONTACT_EMAIL, "Discuss Project"),
                Action::jump("#contact", "Contact Form"),
            ],
        ),
        Intent::About => Reply::new(
            "I'm a product designer and engineer based in Melbourne, blending creativity with technical expertise to build digital products that delight users.\n\n\
             With experience at ANZ and The Human Archives, I've led projects spanning fintech platforms, cultural preservation initiatives, and interactive experiences that connect people with stories.\n\n\
             When I'm not designing or coding, you'll find me exploring new cultures, playing soccer, or diving into history books.",
            vec![Action::jump("#about", "Read Full Story")],
        ),
        Intent::Name => Reply::new(
            "My name is Lukas Nilsson! I'm a product designer and engineer based in Melbourne, Australia. I love creating digital experiences that blend design and technology to solve real problems.\n\n\
             You can call me Lukas, and I'm always excited to chat about design, development, or potential collaborations!",
            vec![Action::jump("#about", "Learn More About Me")],
        ),
        Intent::Location => Reply::new(
            "I'm based in Melbourne, Australia, and work with clients both locally and internationally. I'm comfortable working across different time zones and can accommodate remote collaboration.",
            Vec::new(),
        ),
        Intent::Theme => Reply::new(
            "I can help you change the site theme! Use the theme toggle in the header, or try these commands:\n\n\
             • `/theme dark` - Switch to dark mode\n\
             • `/theme light` - Switch to light mode",
            vec![
                Action::theme(ThemeMode::Dark, "Dark Mode"),
                Action::theme(ThemeMode::Light, "Light Mode"),
            ],
        ),
    }
}

/// Opening message: one of three greetings, always with the same three jumps.
pub fn greeting<R: Rng + ?Sized>(rng: &mut R) -> Reply {
    let text = GREETINGS.choose(rng).copied().unwrap_or(GREETINGS[0]);
    Reply::new(
        text,
        vec![
            Action::jump("#work", "View Projects"),
            Action::jump("#about", "About Lukas"),
            Action::jump("#contact", "Get in Touch"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ActionType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_canonical_phrases_classify() {
        let cases = [
            ("Can I see your projects?", Intent::Projects),
            ("Can I download your resume?", Intent::Resume),
            ("What are your skills?", Intent::Skills),
            ("How do I reach you?", Intent::Contact),
            ("Do you have a LinkedIn?", Intent::Linkedin),
            ("Are you open to freelance?", Intent::Availability),
            ("Tell me your story", Intent::About),
            ("What is your name?", Intent::Name),
            ("Where are you based?", Intent::Location),
            ("Switch to dark mode please", Intent::Theme),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text), Some(expected), "input: {text}");
        }
    }

    #[test]
    fn test_first_matching_intent_wins() {
        // "hire" appears in both contact and availability; contact is checked first.
        assert_eq!(classify("I want to hire you"), Some(Intent::Contact));
        // "show" is a projects keyword even next to a skills keyword.
        assert_eq!(classify("show me your stack"), Some(Intent::Projects));
    }

    #[test]
    fn test_input_is_trimmed_and_lowercased() {
        assert_eq!(classify("   PROJECTS   "), Some(Intent::Projects));
    }

    #[test]
    fn test_unrecognized_text_gets_generic_reply() {
        assert_eq!(classify("Good morning!"), None);
        assert_eq!(classify(""), None);
        let fallback = respond(None);
        assert!(fallback.text.starts_with("I'd be happy to help!"));
        assert!(fallback.actions.is_empty());
        assert_eq!(reply("Good morning!"), fallback);
    }

    #[test]
    fn test_respond_is_deterministic() {
        for intent in Intent::ALL {
            assert_eq!(respond(Some(intent)), respond(Some(intent)));
        }
    }

    #[test]
    fn test_contact_reply_actions() {
        let contact = respond(Some(Intent::Contact));
        let kinds: Vec<_> = contact.actions.iter().map(|a| a.action_type).collect();
        assert_eq!(kinds, vec![ActionType::Email, ActionType::Link, ActionType::Jump]);
        assert_eq!(contact.actions[0].target, CONTACT_EMAIL);
    }

    #[test]
    fn test_skills_reply_has_single_jump() {
        let skills = respond(Some(Intent::Skills));
        assert!(skills.text.starts_with("My core skills include:"));
        assert_eq!(skills.actions, vec![Action::jump("#about", "Learn More About Me")]);
    }

    #[test]
    fn test_location_reply_has_no_actions() {
        assert!(respond(Some(Intent::Location)).actions.is_empty());
    }

    #[test]
    fn test_greeting_is_one_of_three_with_fixed_actions() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let hello = greeting(&mut rng);
            assert!(GREETINGS.contains(&hello.text.as_str()));
            let targets: Vec<_> = hello.actions.iter().map(|a| a.target.as_str()).collect();
            assert_eq!(targets, vec!["#work", "#about", "#contact"]);
        }
    }

    #[test]
    fn test_intent_round_trips_through_str() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
        assert!("weather".parse::<Intent>().is_err());
    }
}
