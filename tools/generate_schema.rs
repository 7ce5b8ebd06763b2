//! JSON Schema生成ツール
//!
//! src/domain/config.rsの設定構造から以下を自動生成します：
//! 1. JSON Schema (schema/config.json)
//! 2. Markdownリファレンス (CONFIGURATION.md)
//!
//! 実行方法:
//! ```
//! cargo run --bin generate_schema
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::fs;
use PinchDial::domain::config::AppConfig;

fn main() {
    println!("JSON Schema生成中...");

    // AppConfigからJSON Schemaを生成
    let schema = schema_for!(AppConfig);
    let json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema to JSON");

    fs::create_dir_all("schema").expect("Failed to create schema/ directory");
    fs::write("schema/config.json", &json).expect("Failed to write schema/config.json");
    println!("  ✓ schema/config.json");

    let schema_value: Value = serde_json::from_str(&json).expect("Failed to parse generated schema");
    let markdown = generate_markdown(&schema_value);

    fs::write("CONFIGURATION.md", markdown).expect("Failed to write CONFIGURATION.md");
    println!("  ✓ CONFIGURATION.md");

    println!("✅ 生成完了: schema/config.json + CONFIGURATION.md");
}

/// JSON Schemaからマークダウンリファレンスを生成
fn generate_markdown(schema: &Value) -> String {
    let mut md = String::new();

    md.push_str("# 設定リファレンス (Configuration Reference)\n\n");
    md.push_str("`config.toml`はPinchDialの動作を制御する設定ファイルです。\n");
    md.push_str("ファイルが存在しない・パースできない場合はデフォルト値で起動します（警告ログ出力）。\n\n");
    md.push_str("**設定ファイルの場所**: `config.toml` (プロジェクトルート)  \n");
    md.push_str("**サンプル**: `config.toml.example`\n\n");
    md.push_str("⚠️ このドキュメントは `cargo run --bin generate_schema` で自動生成されます。\n");
    md.push_str("説明を変更する場合は `src/domain/config.rs` のdoc commentsを編集してください。\n\n");
    md.push_str("## 設定項目\n\n");

    let defs = schema
        .get("$defs")
        .and_then(|d| d.as_object())
        .cloned()
        .unwrap_or_default();

    if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, prop) in props {
            md.push_str(&format!("### [{}] - {}\n\n", key, section_name(key)));

            // セクションは$ref経由で定義される
            if let Some(def_name) = prop
                .get("$ref")
                .and_then(|r| r.as_str())
                .and_then(|r| r.strip_prefix("#/$defs/"))
            {
                if let Some(def_schema) = defs.get(def_name) {
                    push_properties_table(&mut md, def_schema);
                }
            }
        }
    }

    md
}

/// 1セクション分のプロパティテーブルを出力
fn push_properties_table(md: &mut String, schema: &Value) {
    let props = match schema.get("properties").and_then(|p| p.as_object()) {
        Some(props) if !props.is_empty() => props,
        _ => return,
    };

    md.push_str("| 設定項目 | 型 | 説明 |\n");
    md.push_str("|---------|-----|---------|\n");

    for (key, prop) in props {
        md.push_str(&format!(
            "| `{}` | {} | {} |\n",
            key,
            type_string(prop),
            description(prop)
        ));
    }
    md.push('\n');
}

/// 型を文字列で取得
fn type_string(schema: &Value) -> String {
    if schema.get("$ref").is_some() {
        return "enum".to_string();
    }

    match schema.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => {
            // Union型（例: ["string", "null"]）
            let names: Vec<&str> = types.iter().filter_map(|t| t.as_str()).collect();
            names.join(" \\| ")
        }
        _ => "unknown".to_string(),
    }
}

/// 説明文を取得（改行・パイプはテーブル用に整形）
fn description(schema: &Value) -> String {
    schema
        .get("description")
        .and_then(|d| d.as_str())
        .map(|d| {
            d.replace("\n\n", "<br>")
                .replace('\n', " ")
                .replace('|', "\\|")
        })
        .unwrap_or_else(|| "-".to_string())
}

/// セクション名をフォーマット
fn section_name(key: &str) -> String {
    match key {
        "camera" => "カメラ設定".to_string(),
        "tracker" => "ハンドトラッカー設定".to_string(),
        "gesture" => "ジェスチャ設定".to_string(),
        "serial" => "シリアル通信設定".to_string(),
        "pipeline" => "ループ設定".to_string(),
        _ => key.to_string(),
    }
}
