#![allow(dead_code)]

use casefile_core::{
    EngineConfig, MessageRecord, RawTime, RecordBatch, SearchEngine, SocialContactRecord,
    SocialGroupRecord,
};
use casefile_index::WhitespaceTokenizer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub fn message(id: &str, sender: &str, content: &str, time: &str, source: &str) -> MessageRecord {
    MessageRecord {
        id: id.to_string(),
        sender: sender.to_string(),
        content: content.to_string(),
        time: Some(RawTime::Text(time.to_string())),
        is_sent: false,
        source_file: source.to_string(),
    }
}

/// Two messages in one conversation: Alice says "hello world", Bob "hello there"
pub fn scenario_batch() -> RecordBatch {
    RecordBatch {
        messages: vec![
            message("m1", "Alice", "hello world", "2024-01-01 10:00:00", "f1"),
            message("m2", "Bob", "hello there", "2024-01-01 10:05:00", "f1"),
        ],
        ..Default::default()
    }
}

pub fn mixed_batch() -> RecordBatch {
    let mut batch = scenario_batch();
    batch.messages.push(message(
        "m3",
        "Carol",
        "meet at the station tomorrow",
        "2024-01-02 09:00:00",
        "f2",
    ));
    batch.social_groups.push(SocialGroupRecord {
        group_id: "g1".to_string(),
        group_name: "station crew".to_string(),
        ..Default::default()
    });
    batch.social_contacts.push(SocialContactRecord {
        wechat_id: "w1".to_string(),
        nickname: "alice_w".to_string(),
        remark: "hello friend".to_string(),
        ..Default::default()
    });
    batch
}

pub fn whitespace_engine() -> SearchEngine {
    SearchEngine::with_tokenizer(EngineConfig::new(), Arc::new(WhitespaceTokenizer))
}

pub fn loaded_engine(batch: &RecordBatch) -> SearchEngine {
    let engine = whitespace_engine();
    engine.load(batch);
    engine
}

/// A directory of extraction dumps shaped like a phone report export
pub fn dump_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "wechat_chat_1.js",
        r#"var page = {"type": 1, "parents": [["微信"], ["聊天记录"]], "contents": [
            {"id": "w-m1", "user_name": "张三", "content": "明天去北京开会", "time": "2024-03-01 09:00:00", "position": 1},
            {"id": "w-m2", "user_name": "李四", "content": {"text": "好的，北京见"}, "time": "2024-03-01 09:01:30"},
            {"id": "w-m3", "user_name": "张三", "content": "记得带材料", "time": 1709254980}
        ]};"#,
    );
    write(
        tmp.path(),
        "contacts.json",
        r#"{"parents": [["通讯录"]], "contents": {"contents": [
            [["ID", "c1"], ["姓名", "王五"], [[["电话号码", "13800000000"]]]]
        ]}}"#,
    );
    write(
        tmp.path(),
        "wechat_groups.js",
        r#";static.mypico.json.groups= {"parents": [["微信"], ["群组"]], "contents": {"contents": [
            [["群ID", "g1"], ["群名称", "北京出差群"], [[["群公告", "周五集合"], ["人数", 5]]]]
        ]}};"#,
    );
    write(
        tmp.path(),
        "device.json",
        r#"{"type": 0, "contents": {"contents": [[0, ["k", "型号"], ["v", "Pixel 7"]]]}}"#,
    );
    write(
        tmp.path(),
        "apps.json",
        r#"{"parents": [["应用列表"]], "contents": {"contents": [
            [["包名", "com.tencent.mm"], ["名称", "微信"], [[["版本", "8.0.1"]]]]
        ]}}"#,
    );
    write(
        tmp.path(),
        "call_log.json",
        r#"{"parents": [["通话记录"]], "contents": {"contents": [
            [["ID", "k1"], ["号码", "13800000000"], [[["通话时长", "120"], ["呼叫类型", "呼入"]]]],
            [["ID", "k2"], ["号码", "10086"], [[["通话时长", "5"], ["是否删除", "是"]]]]
        ]}}"#,
    );
    write(tmp.path(), "corrupt.json", "var page = {");
    tmp
}

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}
