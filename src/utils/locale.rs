//! User-facing text catalog
//!
//! Every string that reaches an end user (prompt scaffolding, sentinel
//! messages for model-server failures) is rendered here, so the rest of the
//! crate can pass tagged values around and pick the language at the edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used for prompts and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Th,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Th => "th",
        }
    }

    /// Persona placed at the top of every prompt
    pub fn system_persona(&self) -> &'static str {
        match self {
            Self::En => {
                "You are a computer networking expert. Give advice on designing and analyzing \
                 network topology diagrams. Answer in plain, easy-to-understand English and \
                 make the advice practical."
            },
            Self::Th => {
                "คุณเป็นผู้เชี่ยวชาญด้านเครือข่ายคอมพิวเตอร์ ให้คำแนะนำเกี่ยวกับการออกแบบและวิเคราะห์แผนผังเครือข่าย \
                 ให้คำตอบเป็นภาษาไทยที่เข้าใจง่าย และให้คำแนะนำที่เป็นประโยชน์"
            },
        }
    }

    pub fn question_label(&self) -> &'static str {
        match self {
            Self::En => "Question",
            Self::Th => "คำถาม",
        }
    }

    pub fn context_label(&self) -> &'static str {
        match self {
            Self::En => "Network topology data",
            Self::Th => "ข้อมูลแผนผังเครือข่าย",
        }
    }

    /// Wraps a user question into an analysis request
    pub fn question_prompt(&self, question: &str) -> String {
        match self {
            Self::En => format!("Analyze this network topology and answer: {}", question),
            Self::Th => format!("วิเคราะห์แผนผังเครือข่ายนี้และตอบคำถาม: {}", question),
        }
    }

    /// Five-section template used when the user asked nothing specific
    pub fn comprehensive_prompt(&self) -> &'static str {
        match self {
            Self::En => {
                "Analyze this network topology comprehensively, covering the following sections:

1. **Network overview**: describe the structure and main components
2. **Performance analysis**: assess performance and bottlenecks
3. **Security**: identify weaknesses and security risks
4. **Improvement recommendations**: propose ways to develop and improve the network
5. **Caveats**: what should be monitored and maintained

Answer in plain English with clear reasoning and examples."
            },
            Self::Th => {
                "วิเคราะห์แผนผังเครือข่ายนี้อย่างครอบคลุม โดยให้ข้อมูลในหัวข้อต่อไปนี้:

1. **ภาพรวมของเครือข่าย**: อธิบายโครงสร้างและองค์ประกอบหลัก
2. **การวิเคราะห์ประสิทธิภาพ**: ประเมินประสิทธิภาพและจุดคอขวด
3. **ความปลอดภัย**: ระบุจุดอ่อนและความเสี่ยงด้านความปลอดภัย
4. **คำแนะนำการปรับปรุง**: เสนอแนวทางการพัฒนาและปรับปรุง
5. **ข้อควรระวัง**: สิ่งที่ควรติดตามและดูแลรักษา

ให้คำตอบเป็นภาษาไทยที่เข้าใจง่าย พร้อมเหตุผลและตัวอย่างที่ชัดเจน"
            },
        }
    }

    pub fn improvements_question(&self) -> &'static str {
        match self {
            Self::En => {
                "Suggest improvements to this network topology, considering performance, \
                 security and reliability."
            },
            Self::Th => {
                "ให้คำแนะนำในการปรับปรุงแผนผังเครือข่ายนี้ โดยพิจารณาจากประสิทธิภาพ ความปลอดภัย และความน่าเชื่อถือ"
            },
        }
    }

    pub fn security_question(&self) -> &'static str {
        match self {
            Self::En => {
                "Analyze the security of this network topology, identify potential weaknesses \
                 and recommend how to fix them."
            },
            Self::Th => {
                "วิเคราะห์ความปลอดภัยของแผนผังเครือข่ายนี้ และระบุจุดอ่อนที่อาจเกิดขึ้น พร้อมคำแนะนำในการแก้ไข"
            },
        }
    }

    /// Returned when the health check fails before an analysis
    pub fn server_unreachable(&self, base_url: &str) -> String {
        match self {
            Self::En => format!(
                "Cannot reach the model server. Please check that it is running at {}",
                base_url
            ),
            Self::Th => format!(
                "ไม่สามารถเชื่อมต่อกับ Ollama ได้ กรุณาตรวจสอบว่า Ollama ทำงานอยู่ที่ {}",
                base_url
            ),
        }
    }

    pub fn request_timed_out(&self) -> &'static str {
        match self {
            Self::En => "The request to the AI took too long. Please try again.",
            Self::Th => "การเชื่อมต่อกับ AI ใช้เวลานานเกินไป กรุณาลองใหม่อีกครั้ง",
        }
    }

    pub fn upstream_status_error(&self, status: u16) -> String {
        match self {
            Self::En => format!("An error occurred while contacting the AI (Status: {})", status),
            Self::Th => format!("เกิดข้อผิดพลาดในการเชื่อมต่อกับ AI (Status: {})", status),
        }
    }

    pub fn upstream_error(&self, detail: &str) -> String {
        match self {
            Self::En => format!("An error occurred while contacting the AI: {}", detail),
            Self::Th => format!("เกิดข้อผิดพลาดในการเชื่อมต่อกับ AI: {}", detail),
        }
    }

    pub fn empty_response(&self) -> &'static str {
        match self {
            Self::En => "Could not produce an answer.",
            Self::Th => "ไม่สามารถสร้างคำตอบได้",
        }
    }

    pub fn model_changed(&self, model: &str) -> String {
        match self {
            Self::En => format!("Model changed to {} successfully", model),
            Self::Th => format!("เปลี่ยน model เป็น {} เรียบร้อยแล้ว", model),
        }
    }

    pub fn model_name_required(&self) -> &'static str {
        match self {
            Self::En => "Please specify a model name",
            Self::Th => "กรุณาระบุชื่อ model",
        }
    }

    pub fn model_unavailable(&self, model: &str, available: &[String]) -> String {
        match self {
            Self::En => format!(
                "Model '{}' was not found on the model server. Available models: {}",
                model,
                available.join(", ")
            ),
            Self::Th => format!(
                "Model '{}' ไม่พบใน Ollama. Models ที่มีอยู่: {}",
                model,
                available.join(", ")
            ),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "th" | "thai" => Ok(Self::Th),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}
