//! Interactive intake session: dictation, typed items and receipt scans

use anyhow::Result;
use std::path::PathBuf;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::{
    receipt::{process_receipt, Category, Item, Receipt, TesseractOcr},
    summary,
    voice::{parse_spoken_item, SpeechGate, Transcript},
};

const HELP: &str = "\
Type an item (\"milk $3.99\") or a command:
  /listen        start or stop dictation
  /scan <image>  read a receipt photo
  /list [cat]    show the list by category
  /json          print the list as JSON
  /clear         empty the list
  /quit          exit";

/// Messages that can be sent to the app from background work
#[derive(Debug)]
pub enum AppMessage {
    /// Dictation produced a transcript
    VoiceTranscription(Transcript),
    /// Dictation failed or is unavailable
    VoiceError(String),
    /// A receipt scan finished
    ReceiptScanned { image: PathBuf, receipt: Receipt },
    /// A receipt scan failed
    ScanFailed { image: PathBuf, error: String },
}

pub struct App {
    /// Items gathered this session
    items: Vec<Item>,
    /// Dictation gate
    gate: SpeechGate,
    /// Receipt OCR engine
    ocr: TesseractOcr,
    /// App message receiver
    message_rx: mpsc::Receiver<AppMessage>,
    /// App message sender (shared with callbacks and tasks)
    message_tx: mpsc::Sender<AppMessage>,
    /// Should quit
    should_quit: bool,
}

impl App {
    pub fn new(gate: SpeechGate, ocr: TesseractOcr) -> Self {
        let (message_tx, message_rx) = mpsc::channel(100);
        Self {
            items: Vec::new(),
            gate,
            ocr,
            message_rx,
            message_tx,
            should_quit: false,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Main event loop
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", HELP);
        if !self.gate.is_supported() {
            println!("(dictation is not available here, type items instead)");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => self.handle_input(&line).await?,
                        None => break,
                    }
                }

                Some(msg) = self.message_rx.recv() => {
                    self.handle_app_message(msg);
                }
            }

            if self.should_quit {
                break;
            }
        }

        self.gate.stop().await;
        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        if let Some(command) = input.strip_prefix('/') {
            self.handle_slash_command(command).await?;
        } else {
            self.add_spoken(input);
        }
        Ok(())
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<()> {
        let (command, args) = input.split_once(' ').unwrap_or((input, ""));
        let args = args.trim();

        match command {
            "quit" | "q" => {
                self.should_quit = true;
            }
            "listen" | "l" => {
                self.toggle_listening().await;
            }
            "scan" => {
                if args.is_empty() {
                    println!("Usage: /scan <image>");
                } else {
                    self.scan(PathBuf::from(args));
                }
            }
            "list" if args.is_empty() => {
                print!("{}", summary::render_items(&self.items));
            }
            "list" => match args.parse::<Category>() {
                Ok(category) => {
                    let items: Vec<Item> = self
                        .items
                        .iter()
                        .filter(|item| item.category == Some(category))
                        .cloned()
                        .collect();
                    print!("{}", summary::render_items(&items));
                }
                Err(e) => println!("{}", e),
            },
            "json" => {
                println!("{}", serde_json::to_string_pretty(&self.items)?);
            }
            "clear" => {
                self.items.clear();
                println!("List cleared");
            }
            "help" | "h" => {
                println!("{}", HELP);
            }
            _ => {
                println!("Unknown command: /{}", command);
            }
        }
        Ok(())
    }

    async fn toggle_listening(&mut self) {
        if self.gate.is_listening() {
            self.gate.stop().await;
            println!("Stopped listening");
            return;
        }

        let tx = self.message_tx.clone();
        let on_result = move |transcript: Transcript| {
            if tx.try_send(AppMessage::VoiceTranscription(transcript)).is_err() {
                tracing::warn!("Dropped transcript, app queue is full");
            }
        };
        let tx = self.message_tx.clone();
        let on_error = move |error: String| {
            if tx.try_send(AppMessage::VoiceError(error)).is_err() {
                tracing::warn!("Dropped dictation error, app queue is full");
            }
        };

        self.gate.start(on_result, on_error).await;
        if self.gate.is_listening() {
            println!("Listening... (/listen again to stop)");
        }
    }

    /// OCR and parse a receipt in the background
    fn scan(&self, image: PathBuf) {
        let tx = self.message_tx.clone();
        let ocr = self.ocr.clone();
        println!("Scanning {}...", image.display());

        tokio::spawn(async move {
            let msg = match process_receipt(&ocr, &image).await {
                Ok(receipt) => AppMessage::ReceiptScanned { image, receipt },
                Err(e) => AppMessage::ScanFailed {
                    image,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg).await;
        });
    }

    fn handle_app_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::VoiceTranscription(transcript) => {
                tracing::debug!(
                    "Heard {:?} (confidence {:.2})",
                    transcript.text,
                    transcript.confidence
                );
                self.add_spoken(&transcript.text);
            }
            AppMessage::VoiceError(error) => {
                println!("Voice input: {}", error);
            }
            AppMessage::ReceiptScanned { image, receipt } => {
                println!(
                    "{}: {} items, total {}",
                    image.display(),
                    receipt.items.len(),
                    summary::format_price(receipt.total)
                );
                if let Some(date) = &receipt.date {
                    println!("Purchased {}", date);
                }
                self.items.extend(receipt.items);
            }
            AppMessage::ScanFailed { image, error } => {
                println!("{}: {}", image.display(), error);
            }
        }
    }

    fn add_spoken(&mut self, text: &str) {
        let item = parse_spoken_item(text);
        println!(
            "Added {} {}",
            summary::display_name(&item),
            summary::format_price(item.price)
        );
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OcrConfig, Platform};
    use crate::receipt::parse_receipt;
    use crate::voice::{RecognitionProvider, RecognitionSession};

    struct NoRecognizer;

    impl RecognitionProvider for NoRecognizer {
        fn create_session(&self) -> Option<Box<dyn RecognitionSession>> {
            None
        }
    }

    fn app(platform: Platform) -> App {
        App::new(
            SpeechGate::new(platform, &NoRecognizer),
            TesseractOcr::new(&OcrConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_typed_line_becomes_spoken_item() {
        let mut app = app(Platform::Web);
        app.handle_input("  milk $3.99  ").await.unwrap();
        app.handle_input("").await.unwrap();

        assert_eq!(app.items(), [Item::new("milk", Some(3.99))]);
    }

    #[tokio::test]
    async fn test_slash_commands() {
        let mut app = app(Platform::Web);
        app.handle_input("bread 2 dollars").await.unwrap();
        app.handle_input("/list").await.unwrap();
        app.handle_input("/list pantry").await.unwrap();
        app.handle_input("/list snacks").await.unwrap();
        app.handle_input("/json").await.unwrap();
        app.handle_input("/clear").await.unwrap();
        assert!(app.items().is_empty());

        app.handle_input("/bogus").await.unwrap();
        assert!(!app.should_quit);
        app.handle_input("/quit").await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_listen_on_mobile_reports_error() {
        let mut app = app(Platform::Android);
        app.handle_input("/listen").await.unwrap();

        assert!(!app.gate.is_listening());
        match app.message_rx.try_recv() {
            Ok(AppMessage::VoiceError(error)) => assert!(error.contains("image upload")),
            other => panic!("expected voice error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transcript_and_receipt_messages_add_items() {
        let mut app = app(Platform::Web);

        app.handle_app_message(AppMessage::VoiceTranscription(Transcript {
            text: "coffee 5 dollars and 50 cents".into(),
            confidence: 0.9,
        }));
        app.handle_app_message(AppMessage::ReceiptScanned {
            image: PathBuf::from("receipt.png"),
            receipt: parse_receipt("Cheddar Cheese 4.50\nTOTAL 4.50"),
        });
        app.handle_app_message(AppMessage::ScanFailed {
            image: PathBuf::from("blurry.png"),
            error: "Failed to process receipt".into(),
        });

        assert_eq!(app.items().len(), 2);
        assert_eq!(app.items()[0].price, Some(5.5));
        assert_eq!(app.items()[0].category, None);
        assert_eq!(app.items()[1].category, Some(Category::Dairy));
    }

    #[tokio::test]
    async fn test_scan_failure_comes_back_as_message() {
        let mut app = App::new(
            SpeechGate::new(Platform::Web, &NoRecognizer),
            TesseractOcr::new(&OcrConfig {
                command: "pantry-intake-no-such-ocr-binary".into(),
                language: "eng".into(),
            }),
        );

        app.handle_input("/scan receipt.png").await.unwrap();

        match app.message_rx.recv().await {
            Some(AppMessage::ScanFailed { image, error }) => {
                assert_eq!(image, PathBuf::from("receipt.png"));
                assert_eq!(error, "Failed to process receipt");
            }
            other => panic!("expected scan failure, got {:?}", other),
        }
    }
}
