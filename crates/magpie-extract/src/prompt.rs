//! Prompt pairs for defect-field extraction

use crate::lang::Lang;

/// System + user prompt pair for the given language, with the report text
/// substituted into the template.
pub fn prompts_for(lang: Lang, text: &str) -> (&'static str, String) {
    match lang {
        Lang::Zh => (SYSTEM_ZH, TEMPLATE_ZH.replace("{text}", text)),
        Lang::En => (SYSTEM_EN, TEMPLATE_EN.replace("{text}", text)),
    }
}

const SYSTEM_ZH: &str = "你是一个专业的缺陷信息提取助手，严格按照要求输出 JSON 格式数据，\
输出内容的语言需与用户输入文本保持一致。";

const SYSTEM_EN: &str = "You are a professional defect information extraction assistant. \
Output strictly JSON-formatted data as required; the language of the output must match \
the user's input text.";

const TEMPLATE_ZH: &str = r#"请从以下缺陷报告文本中提取指定字段，严格按照 JSON 格式输出，不要添加任何额外解释或文本：

需要提取的字段说明：
- title: 缺陷标题（简洁概括，不超过50字）
- description: 缺陷详细描述（完整说明问题现象）
- version: 缺陷出现的软件版本号（无则为空字符串）
- severity: 缺陷严重程度（可选值：Critical, High, Medium, Low, UnKnow）
- steps_to_reproduce: 复现步骤（数组格式，每个元素为一个步骤）
- stack_trace: 堆栈跟踪信息

缺陷报告文本：
{text}

输出要求：
1. 即使信息不全，也必须返回完整的JSON结构，缺失字段填空字符串/空列表；
2. 禁止使用单引号，所有字符串用双引号；
3. 禁止添加多余逗号、注释或其他文本；
4. steps_to_reproduce 必须是数组类型（即使为空也返回[]）；
5. 输出的字段值语言需与输入文本保持一致；
6. severity 无明确值时返回 UnKnow，不要主观推断。
"#;

const TEMPLATE_EN: &str = r#"Extract the specified fields from the following defect report text. Output strictly in JSON format; do not add any explanations or extra text.

Fields to extract:
- title: defect title (concise summary, at most 50 characters)
- description: detailed description of the defect (full account of the observed problem)
- version: software version the defect occurred in (empty string if none)
- severity: defect severity (one of: Critical, High, Medium, Low, UnKnow)
- steps_to_reproduce: steps to reproduce (array format, one step per element)
- stack_trace: stack trace text

Defect report text:
{text}

Output requirements:
1. Even if information is incomplete, return the complete JSON structure with missing fields as empty strings/empty lists;
2. Never use single quotes; all strings use double quotes;
3. No trailing commas, comments or other text;
4. steps_to_reproduce must be an array (return [] even when empty);
5. Field values stay in the language of the input text;
6. When severity is not explicitly stated, report UnKnow rather than guessing.
"#;
