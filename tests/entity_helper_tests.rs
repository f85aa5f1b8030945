use chrono::NaiveDate;
use wechat_oa_message::entity;
use wechat_oa_message::types::{
    Article, MessageHeader, RequestMessage, RequestMsgType, ResponseMessage, ResponseMsgType,
};
use wechat_oa_message::xml::XmlElement;
use wechat_oa_message::WechatError;

const TEXT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xml>
    <ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName>
    <FromUserName><![CDATA[olPjZjsXuQPJoV0HlruZkNzKc91E]]></FromUserName>
    <CreateTime>1357986928</CreateTime>
    <MsgType><![CDATA[text]]></MsgType>
    <Content><![CDATA[TNT2]]></Content>
    <MsgId>5832509444155992350</MsgId>
</xml>
"#;

const IMAGE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xml>
  <ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName>
  <FromUserName><![CDATA[olPjZjsXuQPJoV0HlruZkNzKc91E]]></FromUserName>
  <CreateTime>1357996976</CreateTime>
  <MsgType><![CDATA[image]]></MsgType>
  <PicUrl><![CDATA[http://mmsns.qpic.cn/mmsns/ZxBXNzgHyUqazGkXUvujSOOHruk6XP5P9984HOCSATlW1orZDlpdCA/0]]></PicUrl>
  <MsgId>5832552599987382826</MsgId>
</xml>"#;

const VOICE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xml>
  <ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName>
  <FromUserName><![CDATA[olPjZjsXuQPJoV0HlruZkNzKc91E]]></FromUserName>
  <CreateTime>1361430302</CreateTime>
  <MsgType><![CDATA[voice]]></MsgType>
  <MediaId><![CDATA[X1yfgB2XI-faU6R2jmKz0X1JZmPCxIvM-9ktt4K92BB9577SCi41S-qMl60q5DJo]]></MediaId>
  <Format><![CDATA[amr]]></Format>
  <MsgId>5847298622973403529</MsgId>
</xml>"#;

#[test]
fn test_unix_time() {
    let result = entity::from_unix_time(1358061152).unwrap();
    let expect = NaiveDate::from_ymd_opt(2013, 1, 13)
        .unwrap()
        .and_hms_opt(15, 12, 32)
        .unwrap();
    assert_eq!(result.naive_local(), expect);
}

#[test]
fn test_fill_entity_with_xml() {
    let entity = RequestMessage::parse(TEXT_XML).unwrap();

    assert_eq!(entity.header().to_user_name, "gh_a96a4a619366");
    assert_eq!(entity.header().from_user_name, "olPjZjsXuQPJoV0HlruZkNzKc91E");
    assert_eq!(entity.header().unix_time(), 1357986928);
    assert_eq!(entity.msg_type(), RequestMsgType::Text);

    let RequestMessage::Text(text) = entity else {
        panic!("expected text request");
    };
    assert_eq!(text.content, "TNT2");
    assert_eq!(text.msg_id, 5832509444155992350);
}

#[test]
fn test_convert_text_entity_to_xml() {
    let request = RequestMessage::parse(TEXT_XML).unwrap();

    let mut response = ResponseMessage::from_request(&request, ResponseMsgType::Text);
    let ResponseMessage::Text(text) = &mut response else {
        panic!("expected text response");
    };
    text.content = "新内容".to_string();

    let doc = response.to_xml().unwrap();
    assert_eq!(doc.name(), "xml");
    assert_eq!(doc.child_text("Content"), Some("新内容"));

    let reparsed = XmlElement::parse(&response.to_xml_string().unwrap()).unwrap();
    assert_eq!(reparsed.child_text("Content"), Some("新内容"));
}

#[test]
fn test_response_envelope_order_and_swap() {
    let request = RequestMessage::parse(TEXT_XML).unwrap();
    let response = ResponseMessage::from_request(&request, ResponseMsgType::Text);
    let doc = response.to_xml().unwrap();

    let names: Vec<&str> = doc.children().iter().map(XmlElement::name).collect();
    assert_eq!(
        names,
        vec!["ToUserName", "FromUserName", "CreateTime", "MsgType", "Content"]
    );
    assert_eq!(doc.child_text("ToUserName"), Some("olPjZjsXuQPJoV0HlruZkNzKc91E"));
    assert_eq!(doc.child_text("FromUserName"), Some("gh_a96a4a619366"));
    assert_eq!(doc.child_text("MsgType"), Some("text"));

    // CreateTime is stamped at reply time, not copied from the request
    let create_time: i64 = doc.child_text("CreateTime").unwrap().parse().unwrap();
    assert!(create_time > 1357986928);
    assert!(!doc.child("CreateTime").unwrap().is_cdata());
}

#[test]
fn test_convert_news_entity_to_xml() {
    let request = RequestMessage::parse(TEXT_XML).unwrap();

    let mut response = ResponseMessage::from_request(&request, ResponseMsgType::News);
    let ResponseMessage::News(news) = &mut response else {
        panic!("expected news response");
    };
    news.push_article(Article {
        description: "测试说明".to_string(),
        title: "测试标题".to_string(),
        url: "http://www.senparc.com".to_string(),
        pic_url: "http://img.senparc.com/images/v2/logo.jpg'".to_string(),
    })
    .unwrap();
    assert_eq!(news.article_count(), 1);

    let doc = response.to_xml().unwrap();
    assert_eq!(doc.child_text("ArticleCount"), Some("1"));
    let items: Vec<&XmlElement> = doc.child("Articles").unwrap().children_named("item").collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].child_text("Title"), Some("测试标题"));
    assert_eq!(
        items[0].child_text("PicUrl"),
        Some("http://img.senparc.com/images/v2/logo.jpg'")
    );
}

#[test]
fn test_convert_image_request_to_news_xml() {
    let request = RequestMessage::parse(IMAGE_XML).unwrap();
    let RequestMessage::Image(image) = &request else {
        panic!("expected image request");
    };
    assert!(image.media_id.is_empty());

    let mut response = ResponseMessage::from_request(&request, ResponseMsgType::News);
    let ResponseMessage::News(news) = &mut response else {
        panic!("expected news response");
    };
    news.push_article(Article {
        description: "测试说明".to_string(),
        title: "测试标题".to_string(),
        url: "http://www.senparc.com".to_string(),
        pic_url: image.pic_url.clone(),
    })
    .unwrap();
    assert_eq!(news.article_count(), 1);

    let doc = response.to_xml().unwrap();
    let first = doc
        .child("Articles")
        .and_then(|articles| articles.children_named("item").next())
        .unwrap();
    assert_eq!(first.child_text("PicUrl"), Some(image.pic_url.as_str()));
}

#[test]
fn test_convert_music_entity_to_xml() {
    let request = RequestMessage::parse(VOICE_XML).unwrap();
    let RequestMessage::Voice(voice) = &request else {
        panic!("expected voice request");
    };
    assert_eq!(voice.format, "amr");
    assert_eq!(
        voice.media_id,
        "X1yfgB2XI-faU6R2jmKz0X1JZmPCxIvM-9ktt4K92BB9577SCi41S-qMl60q5DJo"
    );

    let mut response = ResponseMessage::from_request(&request, ResponseMsgType::Music);
    let ResponseMessage::Music(music) = &mut response else {
        panic!("expected music response");
    };
    music.music.title = "测试Music".to_string();
    music.music.description = "测试Music的说明".to_string();
    music.music.music_url = "http://weixin.senparc.com/Content/music1.mp3".to_string();
    music.music.hq_music_url = "http://weixin.senparc.com/Content/music2.mp3".to_string();
    let expected = music.music.clone();

    let doc = response.to_xml().unwrap();
    let node = doc.child("Music").unwrap();
    assert_eq!(node.child_text("Title"), Some(expected.title.as_str()));
    assert_eq!(node.child_text("Description"), Some(expected.description.as_str()));
    assert_eq!(node.child_text("MusicUrl"), Some(expected.music_url.as_str()));
    assert_eq!(node.child_text("HQMusicUrl"), Some(expected.hq_music_url.as_str()));
}

#[test]
fn test_response_round_trip_through_fill() {
    let request = RequestMessage::parse(VOICE_XML).unwrap();

    let mut news = ResponseMessage::from_request(&request, ResponseMsgType::News);
    if let ResponseMessage::News(n) = &mut news {
        for i in 0..3 {
            n.push_article(Article {
                title: format!("标题 {}", i),
                description: "a & b <c>".to_string(),
                pic_url: format!("http://example.com/{}.jpg", i),
                url: "http://example.com/?a=1&b=2".to_string(),
            })
            .unwrap();
        }
    }

    let mut music = ResponseMessage::from_request(&request, ResponseMsgType::Music);
    if let ResponseMessage::Music(m) = &mut music {
        m.music.title = "]]> edge".to_string();
        m.music.music_url = "http://example.com/a.mp3".to_string();
    }

    for response in [
        news,
        music,
        ResponseMessage::from_request(&request, ResponseMsgType::Video),
        ResponseMessage::from_request(&request, ResponseMsgType::TransferCustomerService),
    ] {
        let xml = response.to_xml_string().unwrap();
        assert_eq!(ResponseMessage::parse(&xml).unwrap(), response);
    }
}

#[test]
fn test_text_response_parses_as_text_request_shape() {
    let request = RequestMessage::parse(TEXT_XML).unwrap();
    let mut response = ResponseMessage::from_request(&request, ResponseMsgType::Text);
    if let ResponseMessage::Text(text) = &mut response {
        text.content = "新内容".to_string();
    }

    // A text reply shares the text request schema apart from MsgId
    let mut doc = response.to_xml().unwrap();
    doc.push(XmlElement::text_node("MsgId", "1"));
    let RequestMessage::Text(parsed) = RequestMessage::from_xml(&doc).unwrap() else {
        panic!("expected text request");
    };
    assert_eq!(parsed.content, "新内容");
    assert_eq!(&parsed.header, response.header());
}

#[test]
fn test_reply_to_matches_factory() {
    let request = RequestMessage::parse(TEXT_XML).unwrap();
    let header = MessageHeader::reply_to(request.header());
    let from_factory = ResponseMessage::from_request(&request, ResponseMsgType::Image);
    assert_eq!(header.to_user_name, from_factory.header().to_user_name);
    assert_eq!(header.from_user_name, from_factory.header().from_user_name);
    assert_eq!(from_factory.msg_type(), ResponseMsgType::Image);
}

#[test]
fn test_unsupported_msg_type() {
    let xml = TEXT_XML.replace("<![CDATA[text]]>", "<![CDATA[miniprogrampage]]>");
    let err = RequestMessage::parse(&xml).unwrap_err();
    assert!(matches!(err, WechatError::UnsupportedMessageType(ref t) if t == "miniprogrampage"));
}

#[test]
fn test_missing_required_field() {
    let xml = TEXT_XML.replace("<MsgId>5832509444155992350</MsgId>", "");
    let err = RequestMessage::parse(&xml).unwrap_err();
    assert!(matches!(err, WechatError::MissingField(ref f) if f == "MsgId"));

    let xml = TEXT_XML.replace(
        "<ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName>",
        "",
    );
    let err = RequestMessage::parse(&xml).unwrap_err();
    assert!(matches!(err, WechatError::MissingField(ref f) if f == "ToUserName"));
}

#[test]
fn test_non_numeric_create_time() {
    let xml = TEXT_XML.replace("1357986928", "yesterday");
    let err = RequestMessage::parse(&xml).unwrap_err();
    match err {
        WechatError::Format { field, value } => {
            assert_eq!(field, "CreateTime");
            assert_eq!(value, "yesterday");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_malformed_xml() {
    let err = RequestMessage::parse("<xml><ToUserName>").unwrap_err();
    assert!(matches!(err, WechatError::Xml(_)));
}
