//! Treebank Evaluation Tool
//!
//! Trains the backoff and neural taggers on treebank corpora and scores
//! an annotation service's constituency and dependency output against
//! gold treebanks. Metric tables go to stdout; progress goes to the log.

mod client;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sintagma_core::corpus::conll::{self, ConllSentence, TagColumn};
use sintagma_core::corpus::tagged;
use sintagma_core::eval::{dep, DEFAULT_SAMPLE_LIMIT};
use sintagma_core::tree::normalize::LabelRule;
use sintagma_core::{
    BackoffChain, Corpus, Detokenizer, Language, LabelNormalizer, Tokenizer, Tree, TreeEvalRun,
};
use sintagma_trainer::{train_embeddings, EmbeddingConfig, NeuralTagger, TrainConfig};
use tracing::{info, warn};

use client::{AnnotateClient, AnnotateConfig};

/// CLI arguments
#[derive(Parser)]
#[command(name = "treebank-eval")]
#[command(about = "Train taggers and score treebank annotations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Annotation service endpoint
    #[arg(
        short,
        long,
        env = "SINTAGMA_ENDPOINT",
        default_value = "http://localhost:9000"
    )]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(short, long, env = "SINTAGMA_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Pipeline language passed to the service and the detokenizer
    #[arg(short, long, env = "SINTAGMA_LANGUAGE")]
    language: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the n-gram backoff tagger and report held-out accuracy
    Tag {
        /// Tagged training corpus (.conllu or two-column form/tag)
        corpus: PathBuf,

        /// Tag column to read from CoNLL-U input
        #[arg(long, value_enum, default_value_t = Column::Upos)]
        column: Column,

        /// Fraction of sentences held out for evaluation
        #[arg(long, default_value_t = 0.15)]
        test_fraction: f64,

        /// Corpus split seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Tag assigned when every backoff level abstains
        #[arg(long, default_value = "NN")]
        default_tag: String,

        /// Raw text file to tag with the trained chain
        #[arg(long, requires = "output")]
        input: Option<PathBuf>,

        /// Where to write the tagged output
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Train the embedding tagger and report held-out loss and accuracy
    NeuralTag {
        /// Tagged training corpus (.conllu or two-column form/tag)
        corpus: PathBuf,

        /// Tag column to read from CoNLL-U input
        #[arg(long, value_enum, default_value_t = Column::Upos)]
        column: Column,

        /// Classifier training epochs
        #[arg(long, default_value_t = 50)]
        epochs: usize,

        /// Split and shuffle seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Raw text file to tag with inference-domain embeddings
        #[arg(long, requires = "output")]
        input: Option<PathBuf>,

        /// Where to write the tagged output
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Tag raw text through the annotation service's POS annotator
    ServiceTag {
        /// Raw UTF-8 text file to tag
        input: PathBuf,

        /// Where to write the tagged output
        #[arg(long)]
        output: PathBuf,
    },
    /// Score service constituency parses against gold bracket trees
    Constituency {
        /// Gold treebank, one bracketed tree per line
        gold: PathBuf,

        /// Stop after this many scored sentences
        #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
        limit: usize,

        /// Apply the built-in AnCora label normalization rules
        #[arg(long, conflicts_with = "rules")]
        ancora: bool,

        /// JSON file of label normalization rules
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Score service dependency parses against a gold CoNLL-U treebank
    Dependency {
        /// Gold CoNLL-U treebank
        gold: PathBuf,

        /// Evaluate at most this many gold sentences
        #[arg(long)]
        sample: Option<usize>,

        /// Write the hypothesis sentences as CoNLL-U
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Tag column selector mirrored onto the corpus reader.
#[derive(Clone, Copy, ValueEnum)]
enum Column {
    Upos,
    Xpos,
}

impl From<Column> for TagColumn {
    fn from(column: Column) -> Self {
        match column {
            Column::Upos => TagColumn::Upos,
            Column::Xpos => TagColumn::Xpos,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let detok_language = detok_language(cli.language.as_deref());

    match cli.command {
        Commands::Tag {
            corpus,
            column,
            test_fraction,
            seed,
            default_tag,
            input,
            output,
        } => run_tag(
            &corpus,
            column,
            test_fraction,
            seed,
            &default_tag,
            input.as_deref(),
            output.as_deref(),
        ),
        Commands::NeuralTag {
            corpus,
            column,
            epochs,
            seed,
            input,
            output,
        } => run_neural_tag(&corpus, column, epochs, seed, input.as_deref(), output.as_deref()),
        Commands::ServiceTag { input, output } => {
            let config = AnnotateConfig::new(cli.endpoint, cli.timeout)
                .with_language(cli.language.clone())
                .with_annotators(&["tokenize", "ssplit", "pos"]);
            run_service_tag(&input, &output, config, detok_language)
        }
        Commands::Constituency {
            gold,
            limit,
            ancora,
            rules,
        } => {
            let config = AnnotateConfig::new(cli.endpoint, cli.timeout)
                .with_language(cli.language.clone())
                .with_annotators(&["tokenize", "ssplit", "pos", "parse"]);
            run_constituency(&gold, limit, ancora, rules.as_deref(), config, detok_language)
        }
        Commands::Dependency {
            gold,
            sample,
            output,
        } => {
            let config = AnnotateConfig::new(cli.endpoint, cli.timeout)
                .with_language(cli.language.clone())
                .with_annotators(&["tokenize", "ssplit", "pos", "lemma", "depparse"]);
            run_dependency(&gold, sample, output.as_deref(), config, detok_language)
        }
    }
}

fn detok_language(language: Option<&str>) -> Language {
    match language {
        Some("en") | Some("english") => Language::English,
        Some("es") | Some("spanish") => Language::Spanish,
        _ => Language::Generic,
    }
}

/// Loads a tagged corpus, dispatching on the file extension.
fn load_corpus(path: &Path, column: Column) -> Result<Corpus> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    let is_conll = path
        .extension()
        .is_some_and(|ext| ext == "conllu" || ext == "conll");
    let corpus = if is_conll {
        conll::tagged_corpus(reader, column.into())?
    } else {
        tagged::read_tagged(reader)?
    };
    info!(sentences = corpus.len(), "loaded corpus");
    Ok(corpus)
}

fn write_tagged_file(path: &Path, sentences: &[Vec<sintagma_core::TaggedWord>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    tagged::write_tagged(&mut writer, sentences)?;
    writer.flush()?;
    Ok(())
}

fn run_tag(
    corpus_path: &Path,
    column: Column,
    test_fraction: f64,
    seed: u64,
    default_tag: &str,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let corpus = load_corpus(corpus_path, column)?;
    let (train, test) = corpus.split(test_fraction, seed);
    info!(train = train.len(), test = test.len(), "split corpus");

    let chain = BackoffChain::standard(&train, default_tag);
    println!("Backoff tagger accuracy: {:.4}", chain.accuracy(&test)?);

    if let (Some(input), Some(output)) = (input, output) {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("cannot read {}", input.display()))?;
        let sentences = Tokenizer::new().sent_tokenize(&text);
        let tagged = chain.tag_sentences(&sentences);
        write_tagged_file(output, &tagged)?;
        info!(sentences = tagged.len(), output = %output.display(), "wrote tagged text");
    }
    Ok(())
}

fn run_neural_tag(
    corpus_path: &Path,
    column: Column,
    epochs: usize,
    seed: u64,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let corpus = load_corpus(corpus_path, column)?;

    let embedding_config = EmbeddingConfig {
        seed,
        ..EmbeddingConfig::default()
    };
    let vectors = train_embeddings(&corpus.forms(), &embedding_config)?;
    info!(vocabulary = vectors.len(), "trained corpus embeddings");

    let train_config = TrainConfig {
        epochs,
        seed,
        ..TrainConfig::default()
    };
    let (tagger, report) = NeuralTagger::train(&corpus, &vectors, &train_config)?;
    println!("Neural tagger held-out loss: {:.4}", report.loss);
    println!("Neural tagger held-out accuracy: {:.4}", report.accuracy);

    if let (Some(input), Some(output)) = (input, output) {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("cannot read {}", input.display()))?;
        let sentences = Tokenizer::new().sent_tokenize(&text);

        // Inference uses embeddings from the inference domain itself.
        let domain_vectors = train_embeddings(&sentences, &embedding_config)?;
        let mut tagged = Vec::with_capacity(sentences.len());
        for sentence in &sentences {
            tagged.push(tagger.tag(sentence, &domain_vectors)?);
        }
        write_tagged_file(output, &tagged)?;
        info!(sentences = tagged.len(), output = %output.display(), "wrote tagged text");
    }
    Ok(())
}

fn run_service_tag(
    input: &Path,
    output: &Path,
    config: AnnotateConfig,
    language: Language,
) -> Result<()> {
    let client = AnnotateClient::new(config)?;
    let detokenizer = Detokenizer::new(language);

    let text =
        std::fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;
    let sentences = Tokenizer::new().sent_tokenize(&text);
    info!(sentences = sentences.len(), "tagging through the annotation service");

    let mut tagged = Vec::new();
    for sentence in &sentences {
        let response = client.annotate(&detokenizer.detokenize(sentence))?;
        for annotated in &response.sentences {
            tagged.push(annotated.to_tagged());
        }
    }

    write_tagged_file(output, &tagged)?;
    info!(sentences = tagged.len(), output = %output.display(), "wrote tagged text");
    Ok(())
}

fn load_normalizer(ancora: bool, rules: Option<&Path>) -> Result<LabelNormalizer> {
    if let Some(path) = rules {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let rules: Vec<LabelRule> =
            serde_json::from_reader(BufReader::new(file)).context("invalid rules file")?;
        return Ok(LabelNormalizer::new(&rules)?);
    }
    if ancora {
        return Ok(LabelNormalizer::ancora());
    }
    Ok(LabelNormalizer::identity())
}

fn run_constituency(
    gold_path: &Path,
    limit: usize,
    ancora: bool,
    rules: Option<&Path>,
    config: AnnotateConfig,
    language: Language,
) -> Result<()> {
    let normalizer = load_normalizer(ancora, rules)?;
    let client = AnnotateClient::new(config)?;
    let detokenizer = Detokenizer::new(language);

    let file =
        File::open(gold_path).with_context(|| format!("cannot open {}", gold_path.display()))?;
    let mut run = TreeEvalRun::new(limit);
    for (number, line) in BufReader::new(file).lines().enumerate() {
        if run.is_complete() {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let gold = Tree::parse(&normalizer.apply(&line))
            .with_context(|| format!("gold tree on line {} is malformed", number + 1))?;

        let forms: Vec<String> = gold
            .terminals()
            .iter()
            .map(|(_, form)| form.to_string())
            .collect();
        let text = detokenizer.detokenize(&forms);
        let response = client.annotate(&text)?;
        let Some(parse) = response.sentences.first().and_then(|s| s.parse.clone()) else {
            warn!(line = number + 1, "service returned no parse");
            run.skip();
            continue;
        };
        match Tree::parse(&normalizer.apply(&parse)) {
            Ok(hypothesis) => run.observe(&gold, &hypothesis)?,
            Err(err) => {
                warn!(line = number + 1, %err, "service parse is malformed");
                run.skip();
            }
        }
        info!(scored = run.scored(), skipped = run.skipped(), "progress");
    }

    println!("{}", run.summary()?);
    Ok(())
}

fn run_dependency(
    gold_path: &Path,
    sample: Option<usize>,
    output: Option<&Path>,
    config: AnnotateConfig,
    language: Language,
) -> Result<()> {
    let client = AnnotateClient::new(config)?;
    let detokenizer = Detokenizer::new(language);

    let file =
        File::open(gold_path).with_context(|| format!("cannot open {}", gold_path.display()))?;
    let mut gold = conll::read_conll(BufReader::new(file))?;
    if let Some(sample) = sample {
        gold.truncate(sample);
    }
    info!(sentences = gold.len(), "evaluating dependency parses");

    let mut system: Vec<ConllSentence> = Vec::with_capacity(gold.len());
    for (number, sentence) in gold.iter().enumerate() {
        let forms: Vec<String> = sentence.iter().map(|t| t.form.clone()).collect();
        let response = client.annotate(&detokenizer.detokenize(&forms))?;
        // A resplit sentence cannot be aligned; the scorer counts it as
        // skipped when the forms disagree.
        if response.sentences.len() == 1 {
            system.push(response.sentences[0].to_conll());
        } else {
            warn!(
                sentence = number + 1,
                returned = response.sentences.len(),
                "service resplit the sentence"
            );
            system.push(Vec::new());
        }
    }

    if let Some(output) = output {
        let file =
            File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        conll::write_conll(&mut writer, &system)?;
        writer.flush()?;
    }

    let evaluation = dep::evaluate(&gold, &system)?;
    println!("{evaluation}");
    Ok(())
}
