use serde_json::{json, Value};

use crate::model::Location;

pub const DEVWORKS_ID: &str = "5d713995-b721-4c25-9e1a-6c8a1e5f0a01";
pub const MODERNTECH_ID: &str = "5d713a66-ec8c-4b3e-8a6e-3c1a9d2b0b02";
pub const CODEMASTERS_ID: &str = "5d725a03-7f17-4f3c-bb2e-2e7a1c4f0c03";
pub const DEVCENTRAL_ID: &str = "5d725a1b-b20a-4a5e-9b67-9fd8e0a30d04";

const PUBLISHER_ID: &str = "5c8a1d5b-0190-4b5e-bf3c-1a6d4e2f0e01";
const REVIEWER_ID: &str = "5c8a1ec6-2b30-4d4a-9c2e-8b5f7a1d0e02";

pub fn users() -> Vec<Value> {
    vec![
        json!({
            "_id": PUBLISHER_ID,
            "name": "John Doe",
            "email": "john@gmail.com",
            "role": "publisher",
            "createdAt": "2024-01-01T09:00:00.000000Z"
        }),
        json!({
            "_id": REVIEWER_ID,
            "name": "Kevin Smith",
            "email": "kevin@gmail.com",
            "role": "user",
            "createdAt": "2024-01-01T09:05:00.000000Z"
        }),
    ]
}

/// Zipcodes known to the offline geocoder.
pub fn places() -> Vec<(String, Location)> {
    [
        ("02215", -71.105536, 42.350846, "Boston", "MA"),
        ("01854", -71.3357, 42.6486, "Lowell", "MA"),
        ("05405", -73.1953, 44.4759, "Burlington", "VT"),
        ("02881", -71.5258, 41.4805, "Kingston", "RI"),
    ]
    .into_iter()
    .map(|(zipcode, longitude, latitude, city, state)| {
        let mut location = Location::point(longitude, latitude);
        location.formatted_address = Some(format!("{city}, {state} {zipcode}, US"));
        location.city = Some(city.to_string());
        location.state = Some(state.to_string());
        location.zipcode = Some(zipcode.to_string());
        location.country = Some("US".to_string());
        (zipcode.to_string(), location)
    })
    .collect()
}

fn location_of(zipcode: &str) -> Value {
    places()
        .into_iter()
        .find(|(known, _)| known == zipcode)
        .and_then(|(_, location)| serde_json::to_value(location).ok())
        .unwrap_or(Value::Null)
}

pub fn bootcamps() -> Vec<Value> {
    vec![
        json!({
            "_id": DEVWORKS_ID,
            "user": PUBLISHER_ID,
            "name": "Devworks Bootcamp",
            "description": "Devworks is a full stack JavaScript Bootcamp located in the heart of Boston that focuses on the technologies you need to get a high paying job as a web developer",
            "website": "https://devworks.com",
            "phone": "(111) 111-1111",
            "email": "enroll@devworks.com",
            "address": "233 Bay State Rd Boston MA 02215",
            "location": location_of("02215"),
            "careers": ["Web Development", "UI/UX", "Business"],
            "housing": true,
            "jobAssistance": true,
            "jobGuarantee": false,
            "acceptGi": true,
            "createdAt": "2024-01-02T10:00:00.000000Z"
        }),
        json!({
            "_id": MODERNTECH_ID,
            "user": PUBLISHER_ID,
            "name": "ModernTech Bootcamp",
            "description": "ModernTech has one goal, and that is to make you a rockstar developer and/or designer with a six figure salary",
            "website": "https://moderntech.com",
            "phone": "(222) 222-2222",
            "email": "enroll@moderntech.com",
            "address": "220 Pawtucket St, Lowell, MA 01854",
            "location": location_of("01854"),
            "careers": ["Web Development", "UI/UX", "Mobile Development"],
            "housing": false,
            "jobAssistance": true,
            "jobGuarantee": false,
            "acceptGi": true,
            "createdAt": "2024-01-03T10:00:00.000000Z"
        }),
        json!({
            "_id": CODEMASTERS_ID,
            "user": PUBLISHER_ID,
            "name": "Codemasters",
            "description": "Is coding your passion? Codemasters will give you the skills and the tools to become the best developer possible",
            "website": "https://codemasters.com",
            "phone": "(333) 333-3333",
            "email": "enroll@codemasters.com",
            "address": "85 South Prospect Street Burlington VT 05405",
            "location": location_of("05405"),
            "careers": ["Web Development", "Data Science", "Business"],
            "housing": false,
            "jobAssistance": false,
            "jobGuarantee": false,
            "acceptGi": false,
            "createdAt": "2024-01-04T10:00:00.000000Z"
        }),
        json!({
            "_id": DEVCENTRAL_ID,
            "user": PUBLISHER_ID,
            "name": "Devcentral Bootcamp",
            "description": "Is coding your passion? Devcentral will give you the skills and the tools to become the best developer possible",
            "website": "https://devcentral.com",
            "phone": "(444) 444-4444",
            "email": "enroll@devcentral.com",
            "address": "45 Upper College Rd Kingston RI 02881",
            "location": location_of("02881"),
            "careers": ["Mobile Development", "Web Development", "Data Science", "Business"],
            "housing": false,
            "jobAssistance": true,
            "jobGuarantee": true,
            "acceptGi": true,
            "createdAt": "2024-01-05T10:00:00.000000Z"
        }),
    ]
}

pub fn courses() -> Vec<Value> {
    vec![
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000001",
            "title": "Front End Web Development",
            "description": "This course will provide you with all of the essentials to become a successful frontend web developer",
            "weeks": "8",
            "tuition": 8000,
            "minimumSkill": "beginner",
            "scholarshipAvailable": true,
            "bootcamp": DEVWORKS_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-06T10:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000002",
            "title": "Full Stack Web Development",
            "description": "In this course you will learn full stack web development, first learning all about the frontend and then the backend",
            "weeks": "12",
            "tuition": 10000,
            "minimumSkill": "intermediate",
            "scholarshipAvailable": false,
            "bootcamp": DEVWORKS_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-06T11:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000003",
            "title": "Full Stack Web Dev",
            "description": "In this course you will learn all about the front end with HTML, CSS and JavaScript",
            "weeks": "12",
            "tuition": 12000,
            "minimumSkill": "beginner",
            "scholarshipAvailable": true,
            "bootcamp": MODERNTECH_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-07T10:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000004",
            "title": "UI/UX",
            "description": "In this course you will learn to create beautiful interfaces",
            "weeks": "12",
            "tuition": 10000,
            "minimumSkill": "intermediate",
            "scholarshipAvailable": true,
            "bootcamp": MODERNTECH_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-07T11:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000005",
            "title": "Web Design & Development",
            "description": "Get started building websites and web apps with HTML/CSS/JavaScript/PHP",
            "weeks": "10",
            "tuition": 12000,
            "minimumSkill": "beginner",
            "scholarshipAvailable": true,
            "bootcamp": CODEMASTERS_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-08T10:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000006",
            "title": "Data Science Program",
            "description": "In this course you will learn Python for data science, machine learning and big data tools",
            "weeks": "10",
            "tuition": 12000,
            "minimumSkill": "intermediate",
            "scholarshipAvailable": false,
            "bootcamp": CODEMASTERS_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-08T11:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000007",
            "title": "Web Development",
            "description": "This course will teach you how to build high quality web applications with technologies like React, Node.js, PHP & Laravel",
            "weeks": "8",
            "tuition": 8000,
            "minimumSkill": "beginner",
            "scholarshipAvailable": false,
            "bootcamp": DEVCENTRAL_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-09T10:00:00.000000Z"
        }),
        json!({
            "_id": "5d725a4a-7b29-4b0e-8a1c-000000000008",
            "title": "Mobile Development",
            "description": "This course will teach you how to build high quality mobile applications for iOS and Android",
            "weeks": "12",
            "tuition": 10000,
            "minimumSkill": "intermediate",
            "scholarshipAvailable": false,
            "bootcamp": DEVCENTRAL_ID,
            "user": PUBLISHER_ID,
            "createdAt": "2024-01-09T11:00:00.000000Z"
        }),
    ]
}

pub fn reviews() -> Vec<Value> {
    vec![
        json!({
            "_id": "5d7a514b-5d2c-4e8f-a1b3-000000000001",
            "title": "Learned a ton!",
            "text": "Lorem ipsum dolor sit amet, consectetur adipiscing elit",
            "rating": 8,
            "bootcamp": DEVWORKS_ID,
            "user": REVIEWER_ID,
            "createdAt": "2024-01-10T10:00:00.000000Z"
        }),
        json!({
            "_id": "5d7a514b-5d2c-4e8f-a1b3-000000000002",
            "title": "Great bootcamp",
            "text": "Nunc pellentesque, velit a rutrum congue, turpis nunc tincidunt nisl",
            "rating": 10,
            "bootcamp": MODERNTECH_ID,
            "user": REVIEWER_ID,
            "createdAt": "2024-01-10T11:00:00.000000Z"
        }),
        json!({
            "_id": "5d7a514b-5d2c-4e8f-a1b3-000000000003",
            "title": "Got me a developer job",
            "text": "Pellentesque habitant morbi tristique senectus et netus",
            "rating": 7,
            "bootcamp": CODEMASTERS_ID,
            "user": REVIEWER_ID,
            "createdAt": "2024-01-10T12:00:00.000000Z"
        }),
    ]
}
