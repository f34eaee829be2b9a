//! Built-in course catalog used when no `[[modules]]` override is configured.

use crate::domain::{
  ModuleDefinition, Question, QuestionKind, QuizDefinition, SubItemContent, SubItemDefinition, TopicDefinition,
};

fn topic(name: &str, content: &str) -> TopicDefinition {
  TopicDefinition { name: name.into(), content: content.into() }
}

fn lesson(name: &str, content: &str, topics: Vec<TopicDefinition>) -> SubItemDefinition {
  SubItemDefinition { name: name.into(), content: SubItemContent::Text(content.into()), topics }
}

fn test(name: &str, questions: Vec<Question>) -> SubItemDefinition {
  SubItemDefinition {
    name: name.into(),
    content: SubItemContent::Quiz(QuizDefinition { questions }),
    topics: vec![],
  }
}

fn mcq(prompt: &str, options: &[&str], correct: usize) -> Question {
  Question {
    prompt: prompt.into(),
    kind: QuestionKind::Mcq,
    options: Some(options.iter().map(|o| o.to_string()).collect()),
    correct_index: Some(correct),
    expected_answer: None,
  }
}

fn open(prompt: &str) -> Question {
  Question {
    prompt: prompt.into(),
    kind: QuestionKind::OpenEnded,
    options: None,
    correct_index: None,
    expected_answer: Some("answer".into()),
  }
}

/// Ten placeholder MCQs for tests whose question bank is not authored yet.
fn sample_quiz() -> Vec<Question> {
  (1..=10)
    .map(|i| mcq(&format!("Sample Q{i}"), &["Option1", "Option2", "Option3", "Option4"], 0))
    .collect()
}

fn grammar_quiz() -> Vec<Question> {
  vec![
    mcq("You're speaking with Ram. How will you address him?", &["Madam", "Sir", "Buddy", "Bro"], 1),
    mcq("What are the correct pronouns for the male?", &["He/ him", "She/ her", "It", "Them"], 0),
    mcq(
      "Which punctuation mark is used to indicate a pause during speaking?",
      &["Apostrophe", "Quotation Mark", "Exclamation mark", "Comma"],
      3,
    ),
    mcq(
      "\"The customer sent all the documents yesterday.\" Identify the tense in the sentence.",
      &["Present tense", "Past tense", "Future", "None"],
      1,
    ),
    mcq("If the customer is female, how should you address her?", &["Sir", "Bro", "Sister", "Madam"], 3),
    mcq("\"I will call you back.\" Identify the tense in the sentence.", &["Present", "Past", "Future", "None"], 2),
    mcq(
      "\"This product gives better benefits.\" What is the comparison word in the sentence?",
      &["Gives", "Better", "Benefits", "Product"],
      1,
    ),
    mcq("Identify the conjunction: \"I liked the product, but it was costly.\"", &["and", "but", "or", "so"], 1),
    mcq("What is the plural of \"Customer\"?", &["Customers", "Customer's", "Customers'", "Customeres"], 0),
    mcq("Identify the correct pronoun for a company:", &["He", "She", "It", "They"], 2),
  ]
}

fn communication_quiz() -> Vec<Question> {
  [
    "Define effective communication.",
    "Why is active listening important?",
    "How does non-verbal communication complement verbal communication?",
    "Explain the importance of reading in professional communication.",
    "What are key elements of professional writing?",
    "How can persuasive techniques be used in communication?",
    "What role does tone play in communication?",
    "Why is phone etiquette important?",
    "Discuss how attire impacts communication.",
    "Describe the scope of communication in a professional setting.",
  ]
  .iter()
  .map(|p| open(p))
  .collect()
}

/// Soft skills, sales personal skills and BFSI product knowledge.
pub fn seed_catalog() -> Vec<ModuleDefinition> {
  vec![
    ModuleDefinition {
      id: 1,
      title: "Soft Skills".into(),
      description: "Essential soft skills for communication and collaboration.".into(),
      sub_items: vec![
        lesson(
          "Grammar",
          "Key grammar rules for clear communication.",
          vec![
            topic("Parts of Speech", "Nouns, pronouns, verbs, adjectives, adverbs, prepositions, conjunctions and interjections."),
            topic("Tenses", "Present, past and future tenses with their simple, continuous and perfect forms."),
            topic("Sentence Structure & Punctuation", "Subject-verb-object order and the common punctuation marks."),
            topic("Professional Vocabulary", "Tips for building a professional vocabulary."),
          ],
        ),
        test("Grammar test", grammar_quiz()),
        lesson(
          "Communication",
          "Foundations of professional communication.",
          vec![
            topic("Definition and Scope", "What communication is and where it applies at work."),
            topic("Reading", "Reading for comprehension in professional settings."),
            topic("Writing", "Basics of professional writing."),
            topic("Listening", "Strategies for active listening."),
            topic("Speaking", "Tips for effective speaking in various settings."),
            topic("Attire", "Role of attire in non-verbal communication."),
            topic("Persuasion Technique", "Overview of persuasion techniques."),
            topic("Phone Etiquette", "Guide to professional phone etiquette."),
          ],
        ),
        test("Communication test", communication_quiz()),
      ],
    },
    ModuleDefinition {
      id: 2,
      title: "Sales Personal Skills".into(),
      description: "Essential personal skills for sales performance.".into(),
      sub_items: vec![
        lesson(
          "Introduction to Sales",
          "Introduction to sales fundamentals.",
          vec![
            topic("Sales Vs. Marketing", "Contrast between sales and marketing."),
            topic("Role of a Sales-person", "Role and responsibilities of a sales-person."),
          ],
        ),
        test("Introduction to Sales test", sample_quiz()),
        lesson(
          "Handling Objections",
          "Techniques for handling sales objections.",
          vec![
            topic("Building Rapport and Trust", "Building rapport and trust with customers."),
            topic("Customer Pain Points and Trust Indicators", "Identifying customer pain points."),
            topic("Conflict Resolution", "Approaches to conflict resolution."),
            topic("Case Studies", "Real-world case studies in sales."),
          ],
        ),
        test("Handling Objections test", sample_quiz()),
        lesson(
          "Negotiation Skills",
          "Negotiating toward value for both sides.",
          vec![
            topic("Emotional Intelligence", "Role of emotional intelligence in negotiations."),
            topic("Decision Making", "Strategies for effective decision making."),
            topic("Value Creation", "Methods for creating value in negotiations."),
          ],
        ),
        test("Negotiation Skills test", sample_quiz()),
        lesson(
          "Tools and Framework",
          "Sales tooling and qualification frameworks.",
          vec![
            topic("CRM Tool", "Guide to CRM tools."),
            topic("Lead Generation & Prospecting Techniques", "Techniques for lead generation and prospecting."),
            topic("Customer Profiling & Segmentation", "Overview of customer profiling and segmentation."),
            topic("Pipeline Management", "Essentials of pipeline management."),
            topic("AIDA", "Summary of the AIDA model."),
            topic("SPIN", "Introduction to SPIN selling."),
            topic("BANT", "Overview of the BANT framework."),
          ],
        ),
        test("Tools and Framework test", sample_quiz()),
        lesson(
          "Problem-Solving & Resilience",
          "Logical reasoning under pressure.",
          vec![
            topic("Syllogisms", "Basics of syllogisms in logical reasoning."),
            topic("Statement and Assumptions", "Differentiating facts from assumptions."),
            topic("Statement and Conclusions", "Strategies for drawing logical conclusions."),
            topic("Cause and Effect", "Understanding cause and effect in sales."),
            topic("Case Studies", "Real-world examples of problem-solving."),
          ],
        ),
        test("Problem-Solving & Resilience test", sample_quiz()),
        lesson(
          "Time Management",
          "Planning the working day.",
          vec![topic("How to: Set goals & Plan your day", "Step-by-step guide to effective time management.")],
        ),
        test("Time Management test", sample_quiz()),
        lesson(
          "Advanced Sales Techniques",
          "Beyond the first sale.",
          vec![
            topic("B2B and B2C Sales", "Key differences between B2B and B2C sales."),
            topic("Post-Sale Relationship", "Strategies for maintaining post-sale relationships."),
            topic("Win-Win Solutions", "Techniques for achieving win-win sales solutions."),
          ],
        ),
        test("Advanced Sales Techniques test", sample_quiz()),
      ],
    },
    ModuleDefinition {
      id: 3,
      title: "Product Knowledge".into(),
      description: "Banking, financial services and insurance products.".into(),
      sub_items: vec![
        lesson(
          "Foundation to BFSI",
          "The BFSI landscape.",
          vec![
            topic("Bank", "Overview of banks and their services."),
            topic("Financial Institution", "Overview of financial institutions."),
            topic("Insurance", "Basics of insurance products."),
            topic("Fintech", "Introduction to fintech and digital transformation."),
            topic("Regulatory Bodies of BFSI", "Role of regulatory bodies in BFSI."),
          ],
        ),
        test("Foundation to BFSI test", sample_quiz()),
        lesson(
          "Key Instruments of BFSI",
          "Forms, documents and terminology.",
          vec![
            topic("KYC/ e-KYC Form", "Importance of KYC forms."),
            topic("Account Opening Form", "Role of account opening forms."),
            topic("Securities and Loan Processing Document", "Overview of securities and loan documents."),
            topic("Key Terminologies", "Guide to key BFSI terminologies."),
            topic("Interest Rates", "Basics of interest rates in finance."),
          ],
        ),
        test("Key Instruments of BFSI test", sample_quiz()),
        lesson(
          "Products and Services of BFSI",
          "Retail banking products.",
          vec![
            topic("SB, CB Account", "Differences between SB and CB accounts."),
            topic("Credit Card", "How credit cards work and benefits."),
            topic("Fixed Deposit", "Overview of fixed deposits."),
            topic("Recurring Deposit", "Basics of recurring deposits."),
            topic("Personal Loan", "Overview of personal loans."),
            topic("Home Loan", "Key aspects of home loans."),
            topic("Gold Loan", "Introduction to gold loans."),
            topic("Auto Loan", "Essentials of auto loans."),
            topic("Crop/ Agriculture Loan", "Overview of agriculture loans."),
            topic("Top-up Loan", "Guide to top-up loans."),
          ],
        ),
        test("Products and Services of BFSI test", sample_quiz()),
      ],
    },
  ]
}
