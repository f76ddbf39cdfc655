//! Scripted on-device engine.
//!
//! Stands in for an in-browser model: it "loads" for a fixed delay, then
//! answers from keyword-selected templates and streams the reply word by word.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use folio_core::{
    ChatEngine, EngineConfig, EngineLoader, FolioError, HistoryTurn, ModelInfo, Role, TokenSink,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

const ENGINE_NAME: &str = "Mock-Local-Engine";

const OPENERS: [&str; 6] = [
    "Great question! ",
    "I'd love to share that with you. ",
    "Absolutely! ",
    "Sure thing! ",
    "Happy to tell you about that. ",
    "",
];

const FOLLOW_UP_CUES: [&str; 3] = ["more", "detail", "elaborate"];

const ELABORATION: &str = " I'd be happy to dive deeper into any specific aspect that interests you.";

/// Topic a prompt is steered to, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Projects,
    Skills,
    Contact,
    Linkedin,
    Availability,
    About,
    Name,
    General,
}

impl Topic {
    const KEYWORDED: [(Topic, &'static [&'static str]); 7] = [
        (Topic::Projects, &["project", "work", "built", "created"]),
        (Topic::Skills, &["skill", "tech", "expertise"]),
        (Topic::Contact, &["contact", "email", "reach"]),
        (Topic::Linkedin, &["linkedin", "social", "profile"]),
        (Topic::Availability, &["available", "hire", "freelance"]),
        (Topic::About, &["about", "who", "story"]),
        (Topic::Name, &["name", "last name", "nilsson"]),
    ];

    fn of(prompt_lower: &str) -> Topic {
        Self::KEYWORDED
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| prompt_lower.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::General)
    }

    fn variations(&self) -> &'static [&'static str] {
        match self {
            Topic::Projects => &[
                "I've had the pleasure of working on some fascinating projects that blend technology with human-centered design. My most notable work includes the ANZ Plus Digital Platform where I led the design and development of a next-generation mobile banking experience, resulting in a 40% improvement in user engagement.",
                "My portfolio spans several exciting ventures, from fintech innovations to cultural preservation initiatives. The ANZ Plus platform stands out as a significant achievement, but I'm equally proud of The Human Archives project, which created an interactive platform to preserve and share cultural stories.",
                "I've been fortunate to work on diverse projects that challenge conventional thinking. The Pachaayni Experience was particularly rewarding - designing an immersive cultural education platform that bridges indigenous wisdom with modern audiences.",
            ],
            Topic::Skills => &[
                "My skill set is quite diverse, spanning both design and development. I'm proficient in modern design tools like Figma and Adobe XD, while also comfortable coding in React, Python, and Swift. What sets me apart is my ability to bridge the gap between design and engineering.",
                "I've developed expertise across the full product lifecycle. On the design side, I work with Figma, Adobe XD, and user research methodologies. For development, I use React for web applications, Python for backend work, and Swift for iOS development.",
                "My technical foundation includes both creative and engineering skills. I specialize in creating elegant user experiences using Figma and Adobe XD, then bring those designs to life with React, Python, and Swift.",
            ],
            Topic::Contact => &[
                "I'd love to connect with you! You can reach me directly at hello@lukasnilsson.com or connect with me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/. I'm always interested in discussing new opportunities and collaborations.",
                "Getting in touch is easy - you can email me at hello@lukasnilsson.com or find me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/. I'm particularly excited to discuss projects that involve innovative design and meaningful impact.",
                "I'm always happy to hear from potential collaborators! Feel free to reach out via email at hello@lukasnilsson.com or connect with me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/.",
            ],
            Topic::Linkedin => &[
                "You can find me on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/ where I share updates about my work in product design and development. I'm always happy to connect with fellow designers, developers, and anyone interested in creating meaningful digital experiences!",
                "I'm active on LinkedIn at https://www.linkedin.com/in/lukaspnilsson/ where I post about my latest projects and insights into the design and development process. Feel free to connect - I love meeting new people in the industry!",
                "My LinkedIn profile at https://www.linkedin.com/in/lukaspnilsson/ showcases my professional journey and recent work. I use it to share thoughts on design trends, development practices, and the intersection of technology and culture.",
            ],
            Topic::Availability => &[
                "I'm currently available for new projects and opportunities! I work on both freelance and full-time projects, with a focus on product design and development. Based in Melbourne, I can work remotely or on-site.",
                "Yes, I'm actively seeking new collaborations and projects! Whether it's freelance work or full-time opportunities, I'm particularly interested in projects that combine innovative design with technical excellence. I'm based in Melbourne but work with clients globally.",
                "I'm available for exciting new projects and opportunities. My sweet spot is product design and development work that has real impact. I'm based in Melbourne but comfortable working remotely with teams anywhere in the world.",
            ],
            Topic::About => &[
                "I'm a product designer and engineer based in Melbourne, passionate about blending creativity with technical expertise to build digital products that delight users. My journey has taken me from fintech platforms at ANZ to cultural preservation initiatives with The Human Archives.",
                "I'm someone who thrives at the intersection of design and technology. Based in Melbourne, I've spent my career creating digital experiences that connect people with technology in meaningful ways, from banking platforms to cultural storytelling projects.",
                "I'm a designer-developer hybrid who believes in the power of thoughtful technology. My work spans from large-scale fintech platforms to intimate cultural preservation projects, always with a focus on human-centered design and technical excellence.",
            ],
            Topic::Name => &[
                "My name is Lukas Nilsson. I'm a product designer and engineer based in Melbourne, Australia. I love creating digital experiences that blend design and technology to solve real problems.",
                "I'm Lukas Nilsson! I work as a product designer and engineer, specializing in creating elegant digital experiences. Based in Melbourne, I've had the opportunity to work on projects ranging from fintech platforms to cultural preservation initiatives.",
                "Hello! I'm Lukas Nilsson, a product designer and engineer from Melbourne. I'm passionate about building digital products that connect people with technology in meaningful ways, whether that's through banking platforms or cultural storytelling projects.",
            ],
            Topic::General => &[
                "I'd be happy to help you learn about my work! I can tell you about my projects, skills, availability, or how to get in touch. What interests you most?",
                "I'm here to help you explore my portfolio and experience. Feel free to ask about my projects, technical skills, current availability, or how we might work together.",
                "Great to meet you! I can share details about my recent projects, technical expertise, or discuss potential collaborations. What would you like to know about my work?",
            ],
        }
    }
}

/// Split text into tokens that keep their trailing whitespace, so the tokens
/// concatenate back to the exact input.
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(char::is_whitespace)
}

/// Emit `text` token by token, sleeping `delay` before each token.
///
/// Returns the concatenation of everything emitted.
pub async fn stream_tokens(text: &str, delay: Duration, on_token: TokenSink<'_>) -> String {
    let mut streamed = String::with_capacity(text.len());
    for token in split_tokens(text) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        on_token(token);
        streamed.push_str(token);
    }
    streamed
}

/// The scripted local engine. Constructed not-ready; the loader marks it
/// ready once the simulated load completes.
pub struct LocalEngine {
    config: EngineConfig,
    ready: AtomicBool,
    rng: Mutex<StdRng>,
    fixed_response: Option<String>,
}

impl LocalEngine {
    pub fn new(config: EngineConfig, rng: StdRng) -> Self {
        Self {
            config,
            ready: AtomicBool::new(false),
            rng: Mutex::new(rng),
            fixed_response: None,
        }
    }

    /// Always answer with `response` instead of a template.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Pick the reply text for `prompt` without streaming it.
    pub fn compose_reply(&self, prompt: &str, history: &[HistoryTurn]) -> String {
        if let Some(fixed) = &self.fixed_response {
            return fixed.clone();
        }

        let lower = prompt.to_lowercase();
        let topic = Topic::of(&lower);

        let mut reply = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let opener = OPENERS.choose(&mut *rng).copied().unwrap_or("");
            let body = topic.variations().choose(&mut *rng).copied().unwrap_or("");
            format!("{opener}{body}")
        };

        let follows_user = history.last().is_some_and(|turn| turn.role == Role::User);
        if follows_user && FOLLOW_UP_CUES.iter().any(|cue| lower.contains(cue)) {
            reply.push_str(ELABORATION);
        }

        debug!(topic = ?topic, "Composed local reply");
        reply
    }
}

#[async_trait]
impl ChatEngine for LocalEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            name: ENGINE_NAME.to_string(),
            max_tokens: self.config.max_tokens,
        }
    }

    async fn chat(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        on_token: Option<TokenSink<'_>>,
    ) -> Result<String, FolioError> {
        if !self.is_ready() {
            return Err(FolioError::EngineNotReady);
        }

        debug!(history_len = history.len(), "Generating local response");

        let think = self.config.think_delay();
        if !think.is_zero() {
            tokio::time::sleep(think).await;
        }

        let reply = self.compose_reply(prompt, history);
        let text = match on_token {
            Some(sink) => stream_tokens(&reply, self.config.token_delay(), sink).await,
            None => reply,
        };

        debug!(chars = text.len(), "Local response generated");
        Ok(text)
    }
}

/// Builds [`LocalEngine`]s after the configured load delay.
#[derive(Debug, Clone, Default)]
pub struct LocalEngineLoader {
    seed: Option<u64>,
    fixed_response: Option<String>,
}

impl LocalEngineLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the engine's random choices for reproducible replies.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Engines built by this loader always answer with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }
}

#[async_trait]
impl EngineLoader for LocalEngineLoader {
    async fn load(&self, config: &EngineConfig) -> Result<Arc<dyn ChatEngine>, FolioError> {
        info!(model = %config.model_name, "Loading local engine");

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut engine = LocalEngine::new(config.clone(), rng);
        if let Some(response) = &self.fixed_response {
            engine = engine.with_response(response.clone());
        }

        tokio::time::sleep(config.load_delay()).await;
        engine.mark_ready();

        info!(model = %config.model_name, "Local engine ready");
        Ok(Arc::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_engine(seed: u64) -> LocalEngine {
        let engine = LocalEngine::new(EngineConfig::default(), StdRng::seed_from_u64(seed));
        engine.mark_ready();
        engine
    }

    fn user_turn(text: &str) -> HistoryTurn {
        HistoryTurn {
            role: Role::User,
            content: text.to_string(),
        }
    }

    #[test]
    fn test_split_tokens_preserves_spacing() {
        let tokens: Vec<_> = split_tokens("Hello there friend").collect();
        assert_eq!(tokens, vec!["Hello ", "there ", "friend"]);
        assert_eq!(split_tokens("a  b").collect::<String>(), "a  b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_emits_exact_text() {
        let engine = ready_engine(1).with_response("Hello there friend");
        let mut tokens = Vec::new();
        let mut sink = |token: &str| tokens.push(token.to_string());
        let full = engine.chat("hi", &[], Some(&mut sink)).await.unwrap();

        assert_eq!(full, "Hello there friend");
        assert_eq!(tokens, vec!["Hello ", "there ", "friend"]);
        assert_eq!(tokens.concat(), full);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_waits_between_tokens() {
        let start = tokio::time::Instant::now();
        let mut count = 0;
        let mut sink = |_: &str| count += 1;
        stream_tokens("one two three", Duration::from_millis(50), &mut sink).await;
        assert_eq!(count, 3);
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_chat_before_ready_fails() {
        let engine = LocalEngine::new(EngineConfig::default(), StdRng::seed_from_u64(0));
        let err = engine.chat("hello", &[], None).await.unwrap_err();
        assert!(matches!(err, FolioError::EngineNotReady));
    }

    #[test]
    fn test_project_prompt_gets_project_content() {
        let engine = ready_engine(42);
        for _ in 0..10 {
            let reply = engine.compose_reply("Tell me about a project", &[]);
            assert!(
                Topic::Projects.variations().iter().any(|v| reply.ends_with(v)),
                "unexpected reply: {reply}"
            );
        }
    }

    #[test]
    fn test_reply_starts_with_an_opener() {
        let engine = ready_engine(3);
        for _ in 0..10 {
            let reply = engine.compose_reply("what tech do you use?", &[]);
            assert!(OPENERS.iter().any(|o| reply.starts_with(o)));
            assert!(reply.contains("Figma"));
        }
    }

    #[test]
    fn test_unmatched_prompt_uses_general_topic() {
        assert_eq!(Topic::of("good morning"), Topic::General);
        assert_eq!(Topic::of("can i hire you"), Topic::Availability);
        assert_eq!(Topic::of("who built this"), Topic::Projects);
    }

    #[test]
    fn test_follow_up_cue_appends_elaboration() {
        let engine = ready_engine(9);
        let history = vec![user_turn("tell me more")];
        let reply = engine.compose_reply("tell me more", &history);
        assert!(reply.ends_with(ELABORATION));

        let without_history = engine.compose_reply("tell me more", &[]);
        assert!(!without_history.ends_with(ELABORATION));
    }

    #[test]
    fn test_same_seed_same_reply() {
        let a = ready_engine(11).compose_reply("skills?", &[]);
        let b = ready_engine(11).compose_reply("skills?", &[]);
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_waits_then_returns_ready_engine() {
        let config = EngineConfig::default();
        let start = tokio::time::Instant::now();
        let engine = LocalEngineLoader::with_seed(5).load(&config).await.unwrap();
        assert!(engine.is_ready());
        assert!(start.elapsed() >= config.load_delay());
        assert_eq!(engine.model_info().max_tokens, 256);
    }
}
