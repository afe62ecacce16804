//! Bundled prompt corpora

/// Standalone questions used when long-context mode is off
pub const SHORT_PROMPTS: &[&str] = &[
    "Explain in simple terms what artificial intelligence is.",
    "What are the main causes of climate change?",
    "Describe how plants carry out photosynthesis.",
    "How does the human immune system work?",
    "What were the main causes of the Second World War?",
    "Explain the theory of relativity in plain language.",
    "What are the key principles of effective leadership?",
    "How does blockchain technology work?",
    "What are the main theories about the origin of the universe?",
    "Explain the water cycle and why it matters for life on Earth.",
    "What are the main differences between capitalism and socialism?",
    "How does the human brain process and store memories?",
    "What are the main challenges of space exploration?",
    "Explain the principle of supply and demand in economics.",
    "A word is spelled with the letters of 'listen' rearranged and means quiet. What is it? Answer with the word only.",
    "Which is larger, 9.11 or 9.9?",
    "Describe the basic principles of quantum computing.",
    "How is artificial intelligence changing healthcare?",
    "What are the main effects of global warming?",
    "How do renewable energy sources differ from fossil fuels?",
    "What are the basic principles of a healthy diet?",
    "Why is mental health important?",
    "How did the industrial revolution change social structures?",
    "How do black holes form?",
    "What are the potential applications of gene editing?",
    "How does inflation affect the economy?",
    "What is supply-side economics?",
    "What are the benefits of cultural diversity for a society?",
    "How does globalization affect local cultures?",
    "What are the advantages and challenges of online learning?",
    "How can teachers improve student motivation?",
];

/// A long reference passage and the question asked about it
#[derive(Debug, Clone, Copy)]
pub struct ContextPair {
    /// Background paragraph
    pub paragraph: &'static str,
    /// How many times the paragraph is repeated to build the context
    pub repeat: usize,
    /// Question appended after the context
    pub prompt: &'static str,
}

impl ContextPair {
    /// Full request text: `context + "\n\n" + prompt`
    pub fn render(&self) -> String {
        let context = self.paragraph.repeat(self.repeat);
        format!("{context}\n\n{}", self.prompt)
    }
}

/// Long-context corpus; each rendered context runs to tens of kilobytes
pub const LONG_CONTEXT_PAIRS: &[ContextPair] = &[
    ContextPair {
        paragraph: "Artificial intelligence (AI) is a rapidly developing field of computer science that aims to build machines able to perform tasks that normally require human intelligence, such as visual perception, speech recognition, decision making and language translation. AI systems learn from experience, adapt to new inputs and carry out human-like tasks. The field spans machine learning, neural networks and deep learning, which have driven progress in self-driving cars, virtual assistants and recommendation systems. ",
        repeat: 60,
        prompt: "Explain in simple terms what artificial intelligence is.",
    },
    ContextPair {
        paragraph: "Climate change is a complex global phenomenon driven mainly by human activities that release greenhouse gases into the atmosphere. Burning fossil fuels, deforestation, industrial processes and agriculture raise the concentration of carbon dioxide and other greenhouse gases. These gases form a blanket around the Earth, warming it at an unprecedented rate. Shifting temperature patterns bring more frequent and severe weather events, rising sea levels and the disruption of ecosystems worldwide. ",
        repeat: 58,
        prompt: "What are the main causes of climate change?",
    },
    ContextPair {
        paragraph: "Photosynthesis is a fundamental biological process that lets plants turn light energy into chemical energy. It takes place in the chloroplasts of plant cells, in structures called thylakoids. Chlorophyll, the pigment that makes plants green, captures the light. Plants take in carbon dioxide through small pores called stomata and water through their roots, then use light energy to combine them into glucose and oxygen, releasing oxygen as a by-product that most life on Earth depends on. ",
        repeat: 55,
        prompt: "Describe how plants carry out photosynthesis.",
    },
    ContextPair {
        paragraph: "The human immune system is a complex network of cells, tissues and organs that work together to protect the body from harmful pathogens. It has two main parts: the innate immune system, which gives a fast and non-specific response, and the adaptive immune system, which builds targeted defenses against specific pathogens. Key components include white blood cells such as neutrophils, macrophages and lymphocytes, along with antibodies and the complement system. ",
        repeat: 50,
        prompt: "How does the human immune system work?",
    },
    ContextPair {
        paragraph: "The Second World War lasted from 1939 to 1945 and was one of the deadliest conflicts in human history. Its origins lie in several intertwined factors. The harsh terms of the Treaty of Versailles left Germany economically ruined and resentful, paving the way for fascism and the rise of the Nazi party under Adolf Hitler. The expansionist policies of Nazi Germany, Fascist Italy and Imperial Japan, together with appeasement by the Western powers, let these regimes seize territory unchecked. ",
        repeat: 40,
        prompt: "What were the main causes of the Second World War?",
    },
    ContextPair {
        paragraph: "Albert Einstein developed the theory of relativity in the early twentieth century, transforming our understanding of space, time and gravity. Special relativity, published in 1905, deals with objects moving at very high speeds and holds that the speed of light is constant for every observer, which leads to time dilation and length contraction. General relativity, published in 1915, extends these ideas to gravity: massive objects curve spacetime, and that curvature is what we experience as gravity. ",
        repeat: 40,
        prompt: "Explain the theory of relativity in plain language.",
    },
    ContextPair {
        paragraph: "Effective leadership is essential for guiding organizations, teams and individuals toward their goals. Styles differ, but several principles are widely seen as necessary for success: clear communication so everyone understands the vision, integrity that builds trust, adaptability in changing conditions, empathy that strengthens relationships, decisiveness when choices must be made, and a vision that gives direction. Effective leaders also take responsibility for their actions and keep learning. ",
        repeat: 45,
        prompt: "What are the key principles of effective leadership?",
    },
    ContextPair {
        paragraph: "Blockchain is a distributed ledger technology that records transactions across many computers so that no single record can be altered retroactively without changing every later block. Each block holds a cryptographic hash of the previous block, a timestamp and transaction data. Participants reach agreement on the ledger through consensus mechanisms such as proof of work or proof of stake, which removes the need for a central authority and makes the ledger transparent and tamper-resistant. ",
        repeat: 50,
        prompt: "How does blockchain technology work?",
    },
    ContextPair {
        paragraph: "The water cycle describes how water moves continuously through the Earth and its atmosphere. Heat from the sun evaporates water from oceans, lakes and rivers; plants release more through transpiration. The vapor cools and condenses into clouds, then falls back as precipitation. Water runs off into rivers and seas or soaks into the ground to refill aquifers. The cycle distributes heat around the planet, shapes weather and climate, and supplies the fresh water that ecosystems and people depend on. ",
        repeat: 52,
        prompt: "Explain the water cycle and why it matters for life on Earth.",
    },
    ContextPair {
        paragraph: "Student motivation involves both the cognitive and emotional sides of learning. Relevance matters most: when students see how material connects to their lives, goals and interests, they engage more deeply. Giving students choices builds a sense of autonomy, achievable challenges build competence, and a supportive classroom builds belonging. Timely, specific feedback that praises effort and strategy rather than innate ability helps students develop a growth mindset and persist through difficulty. ",
        repeat: 48,
        prompt: "How can teachers improve student motivation?",
    },
];
